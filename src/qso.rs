//! Contact statements, reduced records, and the documents that carry them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Callsign, Frequency, Mode, RawTimestamp, ReportPair, SummitRef, ZuluTime};

/// Body statement changing the current frequency and/or mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyModeChange {
    /// New current frequency.
    pub frequency: Option<Frequency>,
    /// New current mode.
    pub mode: Option<Mode>,
}

impl FrequencyModeChange {
    /// Returns true when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.mode.is_none()
    }
}

/// Contact line as parsed, before frequency and mode are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactStatement {
    /// Other station's callsign.
    pub their_call: Callsign,
    /// Exchanged reports.
    pub reports: Option<ReportPair>,
    /// Authored timestamp.
    pub timestamp: Option<RawTimestamp>,
    /// Frequency override for this contact and the ones after it.
    pub frequency: Option<Frequency>,
    /// Mode override for this contact and the ones after it.
    pub mode: Option<Mode>,
    /// Other station's summit when the contact is summit-to-summit.
    pub their_reference: Option<SummitRef>,
    /// Free text after `# `.
    pub comments: Option<String>,
}

impl ContactStatement {
    /// Statement with only a callsign.
    pub fn new(their_call: Callsign) -> Self {
        Self {
            their_call,
            reports: None,
            timestamp: None,
            frequency: None,
            mode: None,
            their_reference: None,
            comments: None,
        }
    }

    /// The frequency/mode override carried by this contact, if any.
    pub fn overrides(&self) -> FrequencyModeChange {
        FrequencyModeChange {
            frequency: self.frequency,
            mode: self.mode,
        }
    }
}

/// One body line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyStatement {
    /// Frequency and/or mode change.
    FrequencyMode(FrequencyModeChange),
    /// Logged contact.
    Contact(ContactStatement),
}

/// Contact with frequency and mode resolved against earlier statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Other station's callsign.
    pub their_call: Callsign,
    /// Exchanged reports; `None` means no report on either side.
    pub reports: Option<ReportPair>,
    /// Authored timestamp, `None` when it has to be interpolated.
    pub timestamp: Option<RawTimestamp>,
    /// Resolved frequency, `None` if nothing set one yet.
    pub frequency: Option<Frequency>,
    /// Resolved mode, `None` if nothing set one yet.
    pub mode: Option<Mode>,
    /// Other station's summit.
    pub their_reference: Option<SummitRef>,
    /// Free text comment.
    pub comments: Option<String>,
}

/// Operator, summit and date fields from the top of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preamble {
    /// Operator's callsign.
    pub my_call: Callsign,
    /// Activated summit.
    pub my_reference: SummitRef,
    /// Activation date.
    pub date: NaiveDate,
    /// Local time minus UTC, in hours.
    pub utc_offset: Option<i32>,
}

/// Reduced log: preamble plus one record per contact, times not yet resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDocument {
    /// Validated preamble.
    pub preamble: Preamble,
    /// Contacts in log order.
    pub records: Vec<ContactRecord>,
}

/// Contact with its final UTC time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedContact {
    /// Reduced record.
    pub record: ContactRecord,
    /// Resolved UTC time.
    pub zulu: ZuluTime,
    /// True when `zulu` was filled in between anchors.
    pub interpolated: bool,
}

/// Log with every contact timed; the input to renderers and sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedLog {
    /// Validated preamble.
    pub preamble: Preamble,
    /// Contacts in log order.
    pub contacts: Vec<TimedContact>,
}
