use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use slelog::{
    config::Config,
    grammar,
    runtime::{batch::BatchRunner, events::BatchEvent},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const GRAMMAR_FILE: &str = "sle_grammar.ebnf";

/// Simple log entry for SOTA activations.
///
/// Converts each INPUT log into `<stem>.csv` (SOTA summary) and `<stem>.txt`
/// (activation log). Without inputs, writes the accepted grammar as EBNF.
#[derive(Debug, Clone, Parser)]
#[command(name = "slelog", version, about)]
struct Args {
    /// Log files to convert
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output directory (current directory when omitted)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip the human-readable activation log
    #[arg(long)]
    no_text: bool,

    /// Skip the SOTA summary CSV
    #[arg(long)]
    no_csv: bool,

    /// Also write the timed log as JSON
    #[arg(long)]
    json: bool,

    /// Append converted logs to this SQLite archive
    #[arg(long, value_name = "PATH")]
    sqlite: Option<PathBuf>,

    /// Files converted concurrently
    #[arg(short = 'j', long, default_value_t = 4)]
    jobs: usize,

    /// Enable debug logging of parsed statements and records
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> Config {
        Config {
            output_dir: self.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            write_text: !self.no_text,
            write_summary: !self.no_csv,
            write_json: self.json,
            sqlite_path: self.sqlite.clone(),
            max_concurrent: self.jobs,
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slelog={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.to_config();

    if let Err(e) = fs::create_dir_all(&config.output_dir) {
        eprintln!("Error: cannot create {}: {e}", config.output_dir.display());
        return ExitCode::FAILURE;
    }

    if args.inputs.is_empty() {
        let path = config.output_dir.join(GRAMMAR_FILE);
        return match fs::write(&path, grammar::describe()) {
            Ok(()) => {
                info!(path = %path.display(), "wrote grammar");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: cannot write {}: {e}", path.display());
                ExitCode::FAILURE
            }
        };
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config, args.inputs))
}

async fn run(config: Config, inputs: Vec<PathBuf>) -> ExitCode {
    let runner = BatchRunner::new(config);
    let mut events = runner.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BatchEvent::Converted {
                    path,
                    contacts,
                    interpolated,
                }) => println!(
                    "{}: {contacts} contacts ({interpolated} interpolated)",
                    path.display()
                ),
                Ok(BatchEvent::Failed { path, error }) => {
                    eprintln!("{}: failed: {error}", path.display())
                }
                Ok(BatchEvent::Started { .. }) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = runner.run(inputs).await;
    drop(runner);
    let _ = printer.await;

    match outcome {
        Ok(results) if results.iter().all(|r| r.is_ok()) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
