//! Simple log entry for summit activations.
//!
//! Turns a hand-typed, line-oriented contact log into a timed record list:
//! lines are parsed into preamble and body statements, the current
//! frequency/mode is folded into each contact, authored times are converted
//! to UTC and missing ones are interpolated between anchors.
//!
//! # Examples
//!
//! One log through the whole pipeline:
//! ```
//! use slelog::{
//!     persist::render::summary_lines,
//!     pipeline::convert,
//!     types::Mode,
//! };
//!
//! let text = "my_call W1AW
//! my_reference W1/AA-001
//! 2024-06-01
//! utc -4
//! 14.300 ssb
//! K1ABC 59 59 1200z
//! K2XYZ
//! K3DEF 1210z
//! ";
//! let log = convert(text).expect("convert");
//! assert_eq!(log.contacts.len(), 3);
//! assert_eq!(log.contacts[1].record.mode, Some(Mode::SSB));
//! assert_eq!(log.contacts[1].zulu.to_string(), "1205");
//! assert!(log.contacts[1].interpolated);
//! assert_eq!(
//!     summary_lines(&log)[1],
//!     "V2,W1AW,W1/AA-001,01/06/2024,1205,14.3MHz,SSB,K2XYZ,"
//! );
//! ```
//!
//! Several files at once, archived to SQLite:
//! ```no_run
//! use slelog::{config::Config, runtime::batch::BatchRunner};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cfg = Config {
//!     sqlite_path: Some("activations.db".into()),
//!     ..Config::default()
//! };
//! let runner = BatchRunner::new(cfg);
//! let results = runner
//!     .run(vec!["g-ld-001.sle".into(), "g-ld-003.sle".into()])
//!     .await
//!     .expect("archive");
//! assert!(results.iter().all(|r| r.is_ok()));
//! # }
//! ```
#![deny(missing_docs)]

/// Output and concurrency settings.
pub mod config;
/// Frequency/mode reduction and time reconstruction.
pub mod core;
/// Lexical and statement grammar.
pub mod grammar;
/// Renderers, line files and the SQLite archive.
pub mod persist;
/// Parse, reduce and normalize in one call.
pub mod pipeline;
/// Statements, records and log documents.
pub mod qso;
/// Concurrent multi-file conversion.
pub mod runtime;
/// Field value types.
pub mod types;
