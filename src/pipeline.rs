//! Text in, timed log out.

use thiserror::Error;
use tracing::debug;

use crate::{
    core::{
        reducer::{ReduceError, reduce},
        time::{TimeError, normalize},
    },
    grammar::{GrammarError, parse_document},
    qso::TimedLog,
};

/// Any failure of the parse-reduce-normalize pipeline. All are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A line matched no statement shape.
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    /// A required preamble field is missing.
    #[error(transparent)]
    Reduce(#[from] ReduceError),
    /// Times could not be resolved.
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Runs the whole pipeline over one log.
pub fn convert(text: &str) -> Result<TimedLog, Error> {
    let parsed = parse_document(text)?;
    debug!(
        preamble = parsed.preamble.len(),
        body = parsed.body.len(),
        "parsed document"
    );
    let log = reduce(parsed)?;
    Ok(normalize(log)?)
}
