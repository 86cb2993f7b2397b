//! Line-level statement shapes built from lexical fields.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    qso::{BodyStatement, ContactStatement, FrequencyModeChange},
    types::{Callsign, SummitRef, UTC_OFFSET_HOURS},
};

use super::{GrammarErrorKind, lexical::Cursor};

/// Preamble fields, each allowed at most once per log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreambleField {
    /// `my_call <CALLSIGN>`.
    MyCall,
    /// `my_reference <REF>`.
    MyReference,
    /// `YYYY-MM-DD`.
    Date,
    /// `utc <OFFSET>`.
    UtcOffset,
}

impl fmt::Display for PreambleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreambleField::MyCall => f.write_str("my_call"),
            PreambleField::MyReference => f.write_str("my_reference"),
            PreambleField::Date => f.write_str("date"),
            PreambleField::UtcOffset => f.write_str("utc"),
        }
    }
}

/// One preamble line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreambleStatement {
    /// Operator's callsign.
    MyCall(Callsign),
    /// Activated summit.
    MyReference(SummitRef),
    /// Activation date.
    Date(NaiveDate),
    /// Local time minus UTC, in hours.
    UtcOffset(i32),
}

impl PreambleStatement {
    /// Which preamble field this statement sets.
    pub fn field(&self) -> PreambleField {
        match self {
            PreambleStatement::MyCall(_) => PreambleField::MyCall,
            PreambleStatement::MyReference(_) => PreambleField::MyReference,
            PreambleStatement::Date(_) => PreambleField::Date,
            PreambleStatement::UtcOffset(_) => PreambleField::UtcOffset,
        }
    }
}

/// Any recognized line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Preamble line.
    Preamble(PreambleStatement),
    /// Body line.
    Body(BodyStatement),
}

/// A recognized statement and whatever trailing text it left unconsumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// The statement.
    pub statement: Statement,
    /// Ignored trailing text, empty when the whole line was consumed.
    pub ignored: &'a str,
}

/// Parses one line. `Ok(None)` for blank lines.
///
/// Shapes are tried as preamble statement, then frequency/mode statement,
/// then contact statement.
pub fn parse_line(line: &str) -> Result<Option<ParsedLine<'_>>, GrammarErrorKind> {
    let mut cursor = Cursor::new(line);
    if cursor.is_at_end() {
        return Ok(None);
    }

    let statement = if let Some(preamble) = preamble_statement(&mut cursor)? {
        Statement::Preamble(preamble)
    } else if let Some(change) = frequency_mode_statement(&mut cursor) {
        Statement::Body(BodyStatement::FrequencyMode(change))
    } else if let Some(contact) = contact_statement(&mut cursor) {
        Statement::Body(BodyStatement::Contact(contact))
    } else {
        return Err(GrammarErrorKind::Unrecognized);
    };

    Ok(Some(ParsedLine {
        statement,
        ignored: cursor.rest().trim_end(),
    }))
}

/// A line that opens with a preamble keyword must carry a valid value.
fn preamble_statement(cursor: &mut Cursor<'_>) -> Result<Option<PreambleStatement>, GrammarErrorKind> {
    if cursor.keyword("my_call") {
        return cursor
            .callsign()
            .map(|call| Some(PreambleStatement::MyCall(call)))
            .ok_or(GrammarErrorKind::Expected("callsign after my_call"));
    }
    if cursor.keyword("my_reference") {
        return cursor
            .summit_ref()
            .map(|r| Some(PreambleStatement::MyReference(r)))
            .ok_or(GrammarErrorKind::Expected("summit reference after my_reference"));
    }
    if cursor.keyword("utc") {
        return cursor
            .signed_integer()
            .filter(|hours| UTC_OFFSET_HOURS.contains(hours))
            .map(|hours| Some(PreambleStatement::UtcOffset(hours)))
            .ok_or(GrammarErrorKind::Expected("hour offset from -24 to +24 after utc"));
    }
    match cursor.date() {
        Some(Ok(date)) => Ok(Some(PreambleStatement::Date(date))),
        Some(Err(err)) => Err(GrammarErrorKind::InvalidDate(err.to_string())),
        None => Ok(None),
    }
}

/// Frequency then mode, mode then frequency, frequency alone, mode alone.
fn frequency_mode_statement(cursor: &mut Cursor<'_>) -> Option<FrequencyModeChange> {
    if let Some(frequency) = cursor.frequency() {
        return Some(FrequencyModeChange {
            frequency: Some(frequency),
            mode: cursor.mode(),
        });
    }
    let mode = cursor.mode()?;
    Some(FrequencyModeChange {
        frequency: cursor.frequency(),
        mode: Some(mode),
    })
}

/// Optional contact fields, tried in this order at each position.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Reports,
    Timestamp,
    Frequency,
    Mode,
    SummitToSummit,
}

const CONTACT_SLOTS: [Slot; 5] = [
    Slot::Reports,
    Slot::Timestamp,
    Slot::Frequency,
    Slot::Mode,
    Slot::SummitToSummit,
];

/// Callsign, then any of the optional slots in any order, then a comment.
fn contact_statement(cursor: &mut Cursor<'_>) -> Option<ContactStatement> {
    let call = cursor.callsign()?;
    let mut contact = ContactStatement::new(call);

    'fill: loop {
        for slot in CONTACT_SLOTS {
            if fill_slot(&mut contact, slot, cursor) {
                continue 'fill;
            }
        }
        break;
    }

    contact.comments = cursor.comment();
    Some(contact)
}

/// Fills `slot` from the cursor if it is still empty and the next field fits.
fn fill_slot(contact: &mut ContactStatement, slot: Slot, cursor: &mut Cursor<'_>) -> bool {
    match slot {
        Slot::Reports if contact.reports.is_none() => {
            contact.reports = cursor.report_pair();
            contact.reports.is_some()
        }
        Slot::Timestamp if contact.timestamp.is_none() => {
            contact.timestamp = cursor.timestamp();
            contact.timestamp.is_some()
        }
        Slot::Frequency if contact.frequency.is_none() => {
            contact.frequency = cursor.frequency();
            contact.frequency.is_some()
        }
        Slot::Mode if contact.mode.is_none() => {
            contact.mode = cursor.mode();
            contact.mode.is_some()
        }
        Slot::SummitToSummit if contact.their_reference.is_none() => {
            let mut probe = cursor.clone();
            if !probe.keyword("s2s") {
                return false;
            }
            contact.their_reference = probe.summit_ref();
            if contact.their_reference.is_some() {
                *cursor = probe;
            }
            contact.their_reference.is_some()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, Mode, Zone};

    fn body(line: &str) -> BodyStatement {
        match parse_line(line).expect("parse").expect("statement").statement {
            Statement::Body(b) => b,
            other => panic!("expected body statement, got {other:?}"),
        }
    }

    fn contact(line: &str) -> ContactStatement {
        match body(line) {
            BodyStatement::Contact(c) => c,
            other => panic!("expected contact, got {other:?}"),
        }
    }

    #[test]
    fn frequency_mode_orderings() {
        let both = FrequencyModeChange {
            frequency: Some(Frequency(14.3)),
            mode: Some(Mode::SSB),
        };
        assert_eq!(body("14.300 ssb"), BodyStatement::FrequencyMode(both));
        assert_eq!(body("SSB 14.300"), BodyStatement::FrequencyMode(both));
        assert_eq!(
            body("7.032"),
            BodyStatement::FrequencyMode(FrequencyModeChange {
                frequency: Some(Frequency(7.032)),
                mode: None,
            })
        );
        assert_eq!(
            body("cw"),
            BodyStatement::FrequencyMode(FrequencyModeChange {
                frequency: None,
                mode: Some(Mode::CW),
            })
        );
    }

    #[test]
    fn contact_fields_in_any_order() {
        let c = contact("k1abc s2s g/ld-001 1203z 59 57 ssb 14.285 # nice signal");
        assert_eq!(c.their_call.as_str(), "K1ABC");
        assert_eq!(c.their_reference.map(|r| r.to_string()).as_deref(), Some("G/LD-001"));
        assert_eq!(c.timestamp.map(|t| (t.hhmm, t.zone)), Some((1203, Zone::Zulu)));
        assert_eq!(c.reports.map(|r| r.mine.to_string()).as_deref(), Some("57"));
        assert_eq!(c.mode, Some(Mode::SSB));
        assert_eq!(c.frequency, Some(Frequency(14.285)));
        assert_eq!(c.comments.as_deref(), Some("nice signal"));
    }

    #[test]
    fn contact_with_only_callsign() {
        let c = contact("K2XYZ");
        assert_eq!(c, ContactStatement::new(Callsign::new("K2XYZ")));
    }

    #[test]
    fn out_of_range_report_is_left_as_ignored_text() {
        let parsed = parse_line("K1ABC 69 59 1200z").expect("parse").expect("statement");
        let Statement::Body(BodyStatement::Contact(c)) = parsed.statement else {
            panic!("expected contact");
        };
        assert!(c.reports.is_none());
        assert!(c.timestamp.is_none());
        assert_eq!(parsed.ignored, "69 59 1200z");
    }

    #[test]
    fn repeated_slot_stops_field_matching() {
        let parsed = parse_line("K1ABC 1200z 1210z").expect("parse").expect("statement");
        assert_eq!(parsed.ignored, "1210z");
    }

    #[test]
    fn frequency_mode_line_wins_over_contact() {
        assert!(matches!(body("14.062 cw"), BodyStatement::FrequencyMode(_)));
        assert!(matches!(body("2E0ABC 1200z"), BodyStatement::Contact(_)));
    }

    #[test]
    fn preamble_statements() {
        let p = |line: &str| match parse_line(line).expect("parse").expect("statement").statement {
            Statement::Preamble(p) => p,
            other => panic!("expected preamble, got {other:?}"),
        };
        assert_eq!(p("my_call w1aw"), PreambleStatement::MyCall(Callsign::new("W1AW")));
        assert_eq!(p("utc -4"), PreambleStatement::UtcOffset(-4));
        assert_eq!(p("utc+10"), PreambleStatement::UtcOffset(10));
        assert_eq!(p("my_reference w1/aa-001").field(), PreambleField::MyReference);
        assert_eq!(p("2024-06-01").field(), PreambleField::Date);
    }

    #[test]
    fn malformed_preamble_values_fail() {
        assert_eq!(
            parse_line("my_call 14.300"),
            Err(GrammarErrorKind::Expected("callsign after my_call"))
        );
        assert!(matches!(parse_line("2024-13-01"), Err(GrammarErrorKind::InvalidDate(_))));
        for line in ["utc four", "utc 25", "utc -40000000", "utc -2147483648", "utc 99999999999"] {
            assert_eq!(
                parse_line(line),
                Err(GrammarErrorKind::Expected("hour offset from -24 to +24 after utc")),
                "{line}"
            );
        }
        assert_eq!(
            parse_line("utc -24").map(|p| p.map(|p| p.statement)),
            Ok(Some(Statement::Preamble(PreambleStatement::UtcOffset(-24))))
        );
    }

    #[test]
    fn unrecognized_and_blank_lines() {
        assert_eq!(parse_line("   \t "), Ok(None));
        assert_eq!(parse_line("# just a note"), Err(GrammarErrorKind::Unrecognized));
        assert_eq!(parse_line("...."), Err(GrammarErrorKind::Unrecognized));
    }
}
