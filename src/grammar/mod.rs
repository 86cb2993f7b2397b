//! Line-oriented log grammar: field lexing and statement recognition.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::qso::BodyStatement;

/// Per-field recognizers.
pub mod lexical;
/// Preamble, frequency/mode and contact statement shapes.
pub mod statement;

pub use statement::{PreambleField, PreambleStatement, Statement, parse_line};

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarErrorKind {
    /// No statement shape matches.
    #[error("unrecognized statement")]
    Unrecognized,
    /// A keyword was present but its value was not.
    #[error("expected {0}")]
    Expected(&'static str),
    /// Date-shaped text that is not a calendar date.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// The field was already set earlier in the preamble.
    #[error("duplicate preamble statement `{0}`")]
    DuplicatePreamble(PreambleField),
    /// Preamble statements must precede the first body statement.
    #[error("preamble statement `{0}` after first body statement")]
    PreambleAfterBody(PreambleField),
}

/// A rejected line, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: `{text}`")]
pub struct GrammarError {
    /// 1-based line number.
    pub line: usize,
    /// Failure reason.
    pub kind: GrammarErrorKind,
    /// The offending line.
    pub text: String,
}

/// Statements of a whole log, split into preamble and body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Preamble statements in authored order.
    pub preamble: Vec<PreambleStatement>,
    /// Body statements in authored order.
    pub body: Vec<BodyStatement>,
}

/// Parses a whole log. Stops at the first bad line.
pub fn parse_document(text: &str) -> Result<ParsedDocument, GrammarError> {
    let mut doc = ParsedDocument::default();
    let mut seen = HashSet::<PreambleField>::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let fail = |kind| GrammarError {
            line: lineno,
            kind,
            text: line.to_string(),
        };

        let Some(parsed) = parse_line(line).map_err(fail)? else {
            continue;
        };
        if !parsed.ignored.is_empty() {
            warn!(line = lineno, ignored = parsed.ignored, "ignoring trailing text");
        }
        debug!(line = lineno, statement = ?parsed.statement, "parsed");

        match parsed.statement {
            Statement::Preamble(stmt) => {
                let field = stmt.field();
                if !doc.body.is_empty() {
                    return Err(fail(GrammarErrorKind::PreambleAfterBody(field)));
                }
                if !seen.insert(field) {
                    return Err(fail(GrammarErrorKind::DuplicatePreamble(field)));
                }
                doc.preamble.push(stmt);
            }
            Statement::Body(stmt) => doc.body.push(stmt),
        }
    }

    Ok(doc)
}

/// EBNF listing of the accepted notation.
pub fn describe() -> &'static str {
    GRAMMAR_EBNF
}

const GRAMMAR_EBNF: &str = r##"(* simple log entry notation; one statement per line *)
log              = preamble , body ;
preamble         = { my_call_stmt | date_stmt | my_reference_stmt | utc_stmt } ;  (* each at most once *)
body             = { frequency_mode_stmt | contact_stmt } ;

my_call_stmt     = "my_call" , callsign , rest ;
my_reference_stmt= "my_reference" , reference , rest ;
date_stmt        = digit4 , "-" , digit2 , "-" , digit2 , rest ;
utc_stmt         = "utc" , [ "+" | "-" ] , digits , rest ;

frequency_mode_stmt = ( frequency , [ mode ] | mode , [ frequency ] ) , rest ;
contact_stmt     = callsign , { reports | timestamp | frequency | mode | s2s } , [ comment ] , rest ;
                   (* optional fields in any order, each at most once *)

callsign         = { letter | digit | "/" }- ;          (* not followed by "." *)
reports          = report , blanks , report ;
report           = readability , strength , [ tone ] ;
readability      = "1" .. "5" ;
strength         = "1" .. "9" ;
tone             = "1" .. "9" ;
timestamp        = digit , [ digit , [ digit , [ digit ] ] ] , ( "z" | "l" | "a" | "p" ) ;
frequency        = [ "+" | "-" ] , ( digits , exponent | ( digits , "." , [ digits ] | "." , digits ) , [ exponent ] ) ;
exponent         = ( "e" | "E" ) , [ "+" | "-" ] , digits ;
mode             = "cw" | "ssb" | "fm" | "am" ;          (* any case *)
s2s              = "s2s" , reference ;
reference        = association , "/" , region , "-" , summit_number ;
association      = ( letter | digit ) , [ letter | digit , [ letter | digit ] ] ;
region           = letter , letter ;
summit_number    = digit , [ digit , [ digit , [ digit ] ] ] ;
comment          = "# " , { any } ;
rest             = { any } ;                             (* ignored *)
"##;
