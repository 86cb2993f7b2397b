//! Field recognizers over a single line.
//!
//! Every recognizer skips leading spaces and tabs, and only advances the
//! cursor when the whole field matched. A failed match leaves the cursor
//! where it was, so callers can try alternatives in order.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::{Callsign, Frequency, Mode, RawTimestamp, Report, ReportPair, SummitRef, Zone};

static CALLSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9/]+").expect("callsign regex"));

static REPORT_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-5])([1-9])([1-9])?[ \t]+([1-5])([1-9])([1-9])?").expect("report regex")
});

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,4})([zlap])").expect("timestamp regex"));

static FREQUENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+[eE][+-]?[0-9]+|(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("frequency regex")
});

static MODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:ssb|cw|fm|am)").expect("mode regex"));

static SUMMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]{1,3})/([A-Za-z]{2})-([0-9]{1,4})").expect("summit regex")
});

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("date regex"));

static SIGNED_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("integer regex"));

/// Characters that continue an identifier, so a keyword cannot end before them.
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Position within one line of input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Starts at the beginning of `line`.
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Unconsumed text after any leading blanks.
    pub fn rest(&self) -> &'a str {
        self.line[self.pos..].trim_start_matches([' ', '\t'])
    }

    /// True when only blanks remain.
    pub fn is_at_end(&self) -> bool {
        self.rest().trim_end().is_empty()
    }

    fn offset_of_rest(&self) -> usize {
        self.line.len() - self.rest().len()
    }

    /// Runs `re` at the next field; `build` may still reject the captures.
    /// `accept_next` sees the character right after the match.
    fn lex<T>(
        &mut self,
        re: &Regex,
        accept_next: impl FnOnce(Option<char>) -> bool,
        build: impl FnOnce(&Captures<'a>) -> Option<T>,
    ) -> Option<T> {
        let line: &'a str = self.line;
        let start = self.offset_of_rest();
        let text = &line[start..];
        let caps = re.captures(text)?;
        let end = caps.get(0)?.end();
        if !accept_next(text[end..].chars().next()) {
            return None;
        }
        let value = build(&caps)?;
        self.pos = start + end;
        Some(value)
    }

    /// Matches `word` exactly, followed by a keyword boundary.
    pub fn keyword(&mut self, word: &str) -> bool {
        let start = self.offset_of_rest();
        let text = &self.line[start..];
        let Some(after) = text.strip_prefix(word) else {
            return false;
        };
        if after.chars().next().is_some_and(is_ident_char) {
            return false;
        }
        self.pos = start + word.len();
        true
    }

    /// Letters, digits and `/`, rejected when a `.` follows (that is a frequency).
    pub fn callsign(&mut self) -> Option<Callsign> {
        self.lex(
            &CALLSIGN,
            |next| next != Some('.'),
            |caps| Some(Callsign::new(&caps[0])),
        )
    }

    /// Two RS or RST reports separated by blanks, each preferring RST.
    pub fn report_pair(&mut self) -> Option<ReportPair> {
        self.lex(
            &REPORT_PAIR,
            |next| !next.is_some_and(|c| c.is_ascii_digit()),
            |caps| {
                Some(ReportPair {
                    theirs: report_from(caps, 1)?,
                    mine: report_from(caps, 4)?,
                })
            },
        )
    }

    /// 1-4 digits followed by a zone letter.
    pub fn timestamp(&mut self) -> Option<RawTimestamp> {
        self.lex(
            &TIMESTAMP,
            |_| true,
            |caps| {
                let hhmm = caps[1].parse().ok()?;
                let zone = Zone::from_suffix(caps[2].chars().next()?)?;
                Some(RawTimestamp { hhmm, zone })
            },
        )
    }

    /// Real number with a decimal point or exponent, ending at a token boundary.
    pub fn frequency(&mut self) -> Option<Frequency> {
        self.lex(
            &FREQUENCY,
            |next| !next.is_some_and(|c| c.is_ascii_alphanumeric() || c == '/' || c == '.'),
            |caps| caps[0].parse().ok().map(Frequency),
        )
    }

    /// `cw`, `ssb`, `fm` or `am` in any case, as a whole word.
    pub fn mode(&mut self) -> Option<Mode> {
        self.lex(
            &MODE,
            |next| !next.is_some_and(is_ident_char),
            |caps| caps[0].parse().ok(),
        )
    }

    /// `ASSOCIATION/REGION-NUMBER`.
    pub fn summit_ref(&mut self) -> Option<SummitRef> {
        self.lex(
            &SUMMIT,
            |next| !next.is_some_and(|c| c.is_ascii_digit()),
            |caps| Some(SummitRef::new(&caps[1], &caps[2], &caps[3])),
        )
    }

    /// `YYYY-MM-DD` shape. The inner result reports an impossible calendar date.
    pub fn date(&mut self) -> Option<Result<NaiveDate, chrono::ParseError>> {
        self.lex(
            &DATE,
            |next| !next.is_some_and(|c| c.is_ascii_digit()),
            |caps| Some(NaiveDate::parse_from_str(&caps[0], "%Y-%m-%d")),
        )
    }

    /// Optionally signed decimal integer.
    pub fn signed_integer(&mut self) -> Option<i32> {
        self.lex(&SIGNED_INTEGER, |_| true, |caps| caps[0].parse().ok())
    }

    /// `# ` followed by free text to end of line; empty text counts as no comment.
    pub fn comment(&mut self) -> Option<String> {
        let start = self.offset_of_rest();
        let text = self.line[start..].strip_prefix("# ")?;
        self.pos = self.line.len();
        (!text.is_empty()).then(|| text.to_string())
    }
}

fn report_from(caps: &Captures<'_>, first: usize) -> Option<Report> {
    let digit = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u8>().ok());
    Some(Report {
        readability: digit(first)?,
        strength: digit(first + 1)?,
        tone: digit(first + 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callsign_is_upper_cased() {
        let mut c = Cursor::new("  w1aw/p 59 59");
        assert_eq!(c.callsign().map(|c| c.to_string()), Some("W1AW/P".to_string()));
        assert_eq!(c.rest(), "59 59");
    }

    #[test]
    fn callsign_rejects_frequency_prefix() {
        let mut c = Cursor::new("14.300 ssb");
        assert!(c.callsign().is_none());
        assert_eq!(c.rest(), "14.300 ssb");
    }

    #[test]
    fn report_pair_mixes_rs_and_rst() {
        let mut c = Cursor::new("599 57");
        let pair = c.report_pair().expect("pair");
        assert_eq!(pair.theirs.to_string(), "599");
        assert_eq!(pair.mine.to_string(), "57");

        let mut c = Cursor::new("44 449 1200z");
        let pair = c.report_pair().expect("pair");
        assert_eq!(pair.theirs.to_string(), "44");
        assert_eq!(pair.mine.to_string(), "449");
        assert_eq!(c.rest(), "1200z");
    }

    #[test]
    fn report_digits_out_of_range_are_not_a_report() {
        for text in ["69 59", "59 60", "509 59", "59 5990", "5999 59", "59"] {
            let mut c = Cursor::new(text);
            assert!(c.report_pair().is_none(), "{text}");
            assert_eq!(c.rest(), text);
        }
    }

    #[test]
    fn timestamp_suffix_selects_zone() {
        let cases = [
            ("1200z", Zone::Zulu),
            ("915l", Zone::Local),
            ("7a", Zone::Am),
            ("0130p", Zone::Pm),
        ];
        for (text, zone) in cases {
            let ts = Cursor::new(text).timestamp().expect(text);
            assert_eq!(ts.zone, zone);
        }
        assert_eq!(Cursor::new("0130p").timestamp().map(|t| t.hhmm), Some(130));
        assert!(Cursor::new("12345z").timestamp().is_none());
        assert!(Cursor::new("1200x").timestamp().is_none());
    }

    #[test]
    fn frequency_needs_point_or_exponent() {
        assert_eq!(Cursor::new("14.300").frequency(), Some(Frequency(14.3)));
        assert_eq!(Cursor::new("7.").frequency(), Some(Frequency(7.0)));
        assert_eq!(Cursor::new("1.4e1").frequency(), Some(Frequency(14.0)));
        assert!(Cursor::new("14").frequency().is_none());
        assert!(Cursor::new("2E0ABC").frequency().is_none());
    }

    #[test]
    fn mode_is_a_whole_word() {
        assert_eq!(Cursor::new("SSB").mode(), Some(Mode::SSB));
        assert_eq!(Cursor::new("fm 145.5").mode(), Some(Mode::FM));
        assert!(Cursor::new("am1x").mode().is_none());
        assert!(Cursor::new("cwx").mode().is_none());
    }

    #[test]
    fn summit_ref_parts_are_bounded() {
        let r = Cursor::new("w1/aa-001").summit_ref().expect("ref");
        assert_eq!(r.to_string(), "W1/AA-001");
        assert!(Cursor::new("W1AB/AA-001").summit_ref().is_none());
        assert!(Cursor::new("W1/A-001").summit_ref().is_none());
        assert!(Cursor::new("W1/AA-00001").summit_ref().is_none());
    }

    #[test]
    fn keyword_requires_boundary() {
        assert!(Cursor::new("utc -4").keyword("utc"));
        assert!(!Cursor::new("utcx -4").keyword("utc"));
        assert!(!Cursor::new("my_callsign").keyword("my_call"));
    }

    #[test]
    fn date_reports_impossible_calendar_dates() {
        assert!(matches!(Cursor::new("2024-06-01").date(), Some(Ok(_))));
        assert!(matches!(Cursor::new("2024-02-30").date(), Some(Err(_))));
        assert!(Cursor::new("2024-6-1").date().is_none());
    }

    #[test]
    fn comment_is_verbatim_to_end_of_line() {
        let mut c = Cursor::new("  # QRP, 5W  into   a dipole  ");
        assert_eq!(c.comment().as_deref(), Some("QRP, 5W  into   a dipole  "));
        assert!(c.is_at_end());
        assert!(Cursor::new("#nospace").comment().is_none());
        assert!(Cursor::new("# ").comment().is_none());
    }
}
