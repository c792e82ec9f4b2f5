//! Pass/fail decision for a completed scan.
//!
//! The verdict is computed once, after the whole stream has been read, from
//! the [`ScanOutcome`] returned by [`scan_stream`].

use std::io::{BufRead, Write};

use tracing::info;

use crate::error::Result;
use crate::report::render_summary;
use crate::scan::{scan_stream, ScanOptions, ScanOutcome};

/// Exit status when no critical advisory was observed.
pub const EXIT_PASS: u8 = 0;
/// Exit status when at least one critical advisory was observed.
pub const EXIT_CRITICAL: u8 = 1;
/// Exit status when the scan could not complete.
pub const EXIT_ABORTED: u8 = 2;

/// The outcome of gating an audit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateVerdict {
    /// Number of critical advisories that block the job, including
    /// skipped ones whose report block could not be built.
    pub critical_count: usize,
}

impl GateVerdict {
    pub fn new(critical_count: usize) -> Self {
        Self { critical_count }
    }

    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        Self::new(outcome.critical_count())
    }

    /// Whether the job may proceed.
    pub fn passed(&self) -> bool {
        self.critical_count == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.passed() {
            EXIT_PASS
        } else {
            EXIT_CRITICAL
        }
    }
}

/// Scan `input`, write the full report (blocks and summary) to `out`, and
/// return the verdict.
pub fn run_gate<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    options: &ScanOptions,
) -> Result<GateVerdict> {
    let outcome = scan_stream(input, out, options)?;
    let verdict = GateVerdict::from_outcome(&outcome);

    out.write_all(render_summary(&verdict).as_bytes())?;
    out.flush()?;

    let by_severity: Vec<String> = outcome
        .by_severity
        .iter()
        .map(|(severity, count)| format!("{}={}", severity, count))
        .collect();
    info!(
        lines = outcome.lines_read,
        ignored = outcome.ignored,
        malformed = outcome.malformed,
        critical_malformed = outcome.critical_malformed,
        advisories = outcome.advisories(),
        by_severity = %by_severity.join(","),
        critical = verdict.critical_count,
        passed = verdict.passed(),
        "audit scan complete"
    );

    Ok(verdict)
}
