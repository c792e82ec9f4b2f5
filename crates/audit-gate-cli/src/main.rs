//! audit-gate - fail a CI job on critical dependency advisories
//!
//! Pipe the JSON Lines output of `yarn audit --json` into `audit-gate`:
//!
//! ```text
//! yarn audit --json | audit-gate
//! ```
//!
//! Exit status is `0` when no critical advisory was reported, `1` when at
//! least one was, and `2` when the stream could not be processed.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, Level};

use audit_gate_core::{
    init_tracing, run_gate, GateError, GateVerdict, MalformedPolicy, ScanOptions, EXIT_ABORTED,
};

#[derive(Parser)]
#[command(name = "audit-gate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Fail the build when a dependency audit stream on stdin contains a critical advisory",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Warn about and skip advisory records missing required fields instead of aborting
    #[arg(long)]
    skip_malformed: bool,
}

impl Cli {
    fn scan_options(&self) -> ScanOptions {
        let policy = if self.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        };
        ScanOptions::default().with_malformed(policy)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(&cli) {
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn run(cli: &Cli) -> Result<GateVerdict> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let verdict = run_gate(stdin.lock(), &mut out, &cli.scan_options()).map_err(|err| {
        let context = match &err {
            GateError::Io(_) => "failed to process audit stream",
            _ => "malformed audit advisory (pass --skip-malformed to tolerate)",
        };
        anyhow::Error::new(err).context(context)
    })?;
    out.flush().context("failed to flush stdout")?;

    Ok(verdict)
}
