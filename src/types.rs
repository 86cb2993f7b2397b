//! Typed field values recognized by the lexer and carried through the pipeline.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Accepted `utc` offsets, in hours.
pub const UTC_OFFSET_HOURS: RangeInclusive<i32> = -24..=24;

/// Station identifier, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Callsign(String);

impl Callsign {
    /// Normalizes `raw` to upper case. The lexer guarantees the character set.
    pub fn new(raw: &str) -> Self {
        Self(raw.to_ascii_uppercase())
    }

    /// Returns the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Emission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Continuous Wave.
    CW,
    /// Single side-band phone.
    SSB,
    /// Frequency modulation.
    FM,
    /// Amplitude modulation.
    AM,
}

impl Mode {
    /// Upper-case keyword as written in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::CW => "CW",
            Mode::SSB => "SSB",
            Mode::FM => "FM",
            Mode::AM => "AM",
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cw" => Ok(Mode::CW),
            "ssb" => Ok(Mode::SSB),
            "fm" => Ok(Mode::FM),
            "am" => Ok(Mode::AM),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating frequency in MHz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Frequency(pub f64);

impl Frequency {
    /// Value in MHz.
    pub fn mhz(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Frequency {
    /// Shortest round-trip decimal, keeping one fractional digit for whole values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < 1e16 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One RS or RST signal report, kept as its authored digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Report {
    /// Readability, 1-5.
    pub readability: u8,
    /// Strength, 1-9.
    pub strength: u8,
    /// Tone, 1-9, only present in RST reports.
    pub tone: Option<u8>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.readability, self.strength)?;
        if let Some(tone) = self.tone {
            write!(f, "{tone}")?;
        }
        Ok(())
    }
}

/// Reports exchanged on a contact: the one received and the one sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportPair {
    /// Report given to the other station.
    pub theirs: Report,
    /// Report received from the other station.
    pub mine: Report,
}

/// Summit reference `ASSOCIATION/REGION-NUMBER`, upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummitRef {
    /// 1-3 alphanumerics.
    pub association: String,
    /// Exactly two letters.
    pub region: String,
    /// 1-4 digits as authored, leading zeros kept.
    pub number: String,
}

impl SummitRef {
    /// Builds a reference from lexed parts, normalizing case.
    pub fn new(association: &str, region: &str, number: &str) -> Self {
        Self {
            association: association.to_ascii_uppercase(),
            region: region.to_ascii_uppercase(),
            number: number.to_string(),
        }
    }
}

impl fmt::Display for SummitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{}", self.association, self.region, self.number)
    }
}

/// Zone a timestamp was written in, selected by its suffix letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// `z`: UTC.
    Zulu,
    /// `l`: local 24-hour clock.
    Local,
    /// `a`: local 12-hour clock, morning.
    Am,
    /// `p`: local 12-hour clock, afternoon.
    Pm,
}

impl Zone {
    /// Maps a suffix letter to its zone.
    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'z' => Some(Zone::Zulu),
            'l' => Some(Zone::Local),
            'a' => Some(Zone::Am),
            'p' => Some(Zone::Pm),
            _ => None,
        }
    }

    /// Suffix letter for this zone.
    pub fn suffix(self) -> char {
        match self {
            Zone::Zulu => 'z',
            Zone::Local => 'l',
            Zone::Am => 'a',
            Zone::Pm => 'p',
        }
    }
}

/// Timestamp as authored: `hhmm` packed as hour*100+minute, plus its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawTimestamp {
    /// Packed hour and minute.
    pub hhmm: u16,
    /// Zone suffix.
    pub zone: Zone,
}

impl RawTimestamp {
    /// Hour component.
    pub fn hour(self) -> i32 {
        i32::from(self.hhmm / 100)
    }

    /// Minute component.
    pub fn minute(self) -> i32 {
        i32::from(self.hhmm % 100)
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.hhmm, self.zone.suffix())
    }
}

/// UTC time as signed minutes from midnight of the activation date.
///
/// Not wrapped: timezone arithmetic may push values below zero or past
/// [`MINUTES_PER_DAY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZuluTime(pub i32);

impl ZuluTime {
    /// Builds a time from hour and minute fields.
    pub fn from_hour_minute(hour: i32, minute: i32) -> Self {
        Self(hour * 60 + minute)
    }

    /// Raw minute value.
    pub fn minutes(self) -> i32 {
        self.0
    }

    /// True when the value lies outside the activation date.
    pub fn crosses_midnight(self) -> bool {
        !(0..MINUTES_PER_DAY).contains(&self.0)
    }

    /// Time of day as `hhmm`, wrapped into a single day.
    pub fn hhmm(self) -> u16 {
        let m = self.0.rem_euclid(MINUTES_PER_DAY);
        ((m / 60) * 100 + m % 60) as u16
    }
}

impl fmt::Display for ZuluTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.hhmm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_keeps_one_fraction_digit() {
        assert_eq!(Frequency(14.3).to_string(), "14.3");
        assert_eq!(Frequency(7.0).to_string(), "7.0");
        assert_eq!(Frequency(14.0625).to_string(), "14.0625");
    }

    #[test]
    fn zulu_time_renders_wrapped_hhmm() {
        assert_eq!(ZuluTime::from_hour_minute(12, 5).to_string(), "1205");
        assert_eq!(ZuluTime::from_hour_minute(0, 7).to_string(), "0007");
        assert_eq!(ZuluTime::from_hour_minute(25, 30).to_string(), "0130");
        assert_eq!(ZuluTime::from_hour_minute(-1, 30).to_string(), "2330");
        assert!(ZuluTime::from_hour_minute(-1, 30).crosses_midnight());
        assert!(!ZuluTime::from_hour_minute(23, 59).crosses_midnight());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Ssb".parse::<Mode>(), Ok(Mode::SSB));
        assert_eq!("CW".parse::<Mode>(), Ok(Mode::CW));
        assert!("rtty".parse::<Mode>().is_err());
    }

    #[test]
    fn report_displays_authored_digits() {
        let rst = Report { readability: 5, strength: 9, tone: Some(9) };
        let rs = Report { readability: 4, strength: 7, tone: None };
        assert_eq!(rst.to_string(), "599");
        assert_eq!(rs.to_string(), "47");
    }
}
