use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    grammar::{ParsedDocument, PreambleField, PreambleStatement},
    qso::{BodyStatement, ContactRecord, FrequencyModeChange, LogDocument, Preamble},
    types::{Frequency, Mode},
};

/// Semantic failures after a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// `my_call`, `my_reference` or the date was never given.
    #[error("missing required preamble statement `{0}`")]
    MissingPreamble(PreambleField),
}

/// Current frequency and mode, threaded through the body statements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FoldState {
    /// Last frequency seen.
    pub frequency: Option<Frequency>,
    /// Last mode seen.
    pub mode: Option<Mode>,
}

impl FoldState {
    /// Overwrites the fields present in `change`.
    pub fn apply(self, change: FrequencyModeChange) -> Self {
        Self {
            frequency: change.frequency.or(self.frequency),
            mode: change.mode.or(self.mode),
        }
    }

    /// Folds one statement, yielding a record for contacts.
    pub fn step(self, stmt: BodyStatement) -> (Self, Option<ContactRecord>) {
        match stmt {
            BodyStatement::FrequencyMode(change) => (self.apply(change), None),
            BodyStatement::Contact(contact) => {
                let state = self.apply(contact.overrides());
                let record = ContactRecord {
                    their_call: contact.their_call,
                    reports: contact.reports,
                    timestamp: contact.timestamp,
                    frequency: state.frequency,
                    mode: state.mode,
                    their_reference: contact.their_reference,
                    comments: contact.comments,
                };
                (state, Some(record))
            }
        }
    }
}

/// Requires `my_call`, `my_reference` and the date. The offset is optional.
pub fn build_preamble(stmts: Vec<PreambleStatement>) -> Result<Preamble, ReduceError> {
    let (mut my_call, mut my_reference, mut date, mut utc_offset) = (None, None, None, None);
    for stmt in stmts {
        match stmt {
            PreambleStatement::MyCall(call) => my_call = Some(call),
            PreambleStatement::MyReference(r) => my_reference = Some(r),
            PreambleStatement::Date(d) => date = Some(d),
            PreambleStatement::UtcOffset(hours) => utc_offset = Some(hours),
        }
    }

    Ok(Preamble {
        my_call: my_call.ok_or(ReduceError::MissingPreamble(PreambleField::MyCall))?,
        my_reference: my_reference.ok_or(ReduceError::MissingPreamble(PreambleField::MyReference))?,
        date: date.ok_or(ReduceError::MissingPreamble(PreambleField::Date))?,
        utc_offset,
    })
}

/// Validates the preamble, then materializes one record per contact statement.
pub fn reduce(doc: ParsedDocument) -> Result<LogDocument, ReduceError> {
    let preamble = build_preamble(doc.preamble)?;

    let (_, records) = doc.body.into_iter().fold(
        (FoldState::default(), Vec::new()),
        |(state, mut records), stmt| {
            let (state, record) = state.step(stmt);
            records.extend(record);
            (state, records)
        },
    );

    for (idx, rec) in records.iter().enumerate() {
        if rec.frequency.is_none() || rec.mode.is_none() {
            warn!(contact = idx + 1, call = %rec.their_call, "frequency or mode not set");
        }
    }
    debug!(contacts = records.len(), "reduced log");

    Ok(LogDocument { preamble, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grammar::parse_document,
        types::{Callsign, Frequency, Mode},
    };

    const HEADER: &str = "my_call W1AW\nmy_reference W1/AA-001\n2024-06-01\n";

    fn reduce_text(body: &str) -> LogDocument {
        let doc = parse_document(&format!("{HEADER}{body}")).expect("parse");
        reduce(doc).expect("reduce")
    }

    #[test]
    fn one_record_per_contact() {
        let log = reduce_text("14.300 ssb\nK1ABC 1200z\n7.032 cw\ncw\nK2XYZ\nK3DEF 1210z\n");
        let calls: Vec<_> = log.records.iter().map(|r| r.their_call.as_str()).collect();
        assert_eq!(calls, vec!["K1ABC", "K2XYZ", "K3DEF"]);
    }

    #[test]
    fn contacts_inherit_by_statement_order() {
        let log = reduce_text("14.300 ssb\nK1ABC 1300z\n7.032 cw\nK2XYZ 1200z\n");
        assert_eq!(log.records[0].frequency, Some(Frequency(14.3)));
        assert_eq!(log.records[0].mode, Some(Mode::SSB));
        assert_eq!(log.records[1].frequency, Some(Frequency(7.032)));
        assert_eq!(log.records[1].mode, Some(Mode::CW));
    }

    #[test]
    fn partial_change_keeps_other_field() {
        let log = reduce_text("14.062 cw\nK1ABC\nssb\nK2XYZ\n14.285\nK3DEF\n");
        let got: Vec<_> = log.records.iter().map(|r| (r.frequency, r.mode)).collect();
        assert_eq!(
            got,
            vec![
                (Some(Frequency(14.062)), Some(Mode::CW)),
                (Some(Frequency(14.062)), Some(Mode::SSB)),
                (Some(Frequency(14.285)), Some(Mode::SSB)),
            ]
        );
    }

    #[test]
    fn contact_override_carries_forward() {
        let log = reduce_text("14.300 ssb\nK1ABC 7.032 cw\nK2XYZ\n");
        assert_eq!(log.records[1].frequency, Some(Frequency(7.032)));
        assert_eq!(log.records[1].mode, Some(Mode::CW));
    }

    #[test]
    fn unresolved_frequency_and_mode_pass_through() {
        let log = reduce_text("K1ABC 1200z\n");
        assert_eq!(log.records[0].frequency, None);
        assert_eq!(log.records[0].mode, None);
    }

    #[test]
    fn missing_report_and_optionals_default_to_none() {
        let log = reduce_text("K1ABC\n");
        let rec = &log.records[0];
        assert_eq!(rec.their_call, Callsign::new("K1ABC"));
        assert!(rec.reports.is_none());
        assert!(rec.timestamp.is_none());
        assert!(rec.their_reference.is_none());
        assert!(rec.comments.is_none());
    }

    #[test]
    fn missing_preamble_fields_fail() {
        let cases = [
            ("my_reference W1/AA-001\n2024-06-01\nK1ABC\n", PreambleField::MyCall),
            ("my_call W1AW\n2024-06-01\nK1ABC\n", PreambleField::MyReference),
            ("my_call W1AW\nmy_reference W1/AA-001\nK1ABC\n", PreambleField::Date),
        ];
        for (text, field) in cases {
            let doc = parse_document(text).expect("parse");
            assert_eq!(reduce(doc), Err(ReduceError::MissingPreamble(field)));
        }
    }

    #[test]
    fn utc_offset_is_optional() {
        let log = reduce_text("K1ABC\n");
        assert_eq!(log.preamble.utc_offset, None);
        assert_eq!(log.preamble.my_reference.to_string(), "W1/AA-001");
    }
}
