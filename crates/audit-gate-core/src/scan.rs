//! The single pass over an audit stream.
//!
//! [`scan_stream`] reads the input to completion, writes a report block for
//! every critical advisory as soon as it is seen, and returns the accumulated
//! [`ScanOutcome`]. It never decides the exit status; see
//! [`crate::gate::GateVerdict`].

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tracing::{debug, trace, warn};

use crate::advisory::{CriticalAdvisory, LineRecord, Severity};
use crate::error::{GateError, Result};
use crate::report::write_critical;

/// What to do with an `auditAdvisory` record that lacks required fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Stop the scan and return the error.
    #[default]
    Abort,
    /// Log a warning, count the record, and keep going.
    Skip,
}

/// Scan configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub malformed: MalformedPolicy,
}

impl ScanOptions {
    pub fn with_malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }
}

/// Everything a completed scan observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// Lines read, including blank and unparseable ones.
    pub lines_read: usize,
    /// Lines skipped because they were not advisory records.
    pub ignored: usize,
    /// Advisory records skipped under [`MalformedPolicy::Skip`], including
    /// those counted in `critical_malformed`.
    pub malformed: usize,
    /// Critical advisories whose report fields were missing. They were
    /// skipped under [`MalformedPolicy::Skip`] but still block the job.
    pub critical_malformed: usize,
    /// Advisories with a readable severity, per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Critical advisories, in input order.
    pub critical: Vec<CriticalAdvisory>,
}

impl ScanOutcome {
    pub fn advisories(&self) -> usize {
        self.by_severity.values().sum()
    }

    /// Number of critical advisories seen, reportable or not.
    pub fn critical_count(&self) -> usize {
        self.critical.len() + self.critical_malformed
    }

    pub fn has_critical(&self) -> bool {
        self.critical_count() > 0
    }
}

/// Read `input` line by line and report critical advisories to `out`.
///
/// Lines that are not JSON objects, or whose `type` is not `auditAdvisory`,
/// are skipped silently. Bytes are read as-is, so invalid UTF-8 is just
/// another unparseable line.
///
/// Once an advisory's severity reads as critical it counts against the job
/// even if its report block cannot be built.
pub fn scan_stream<R: BufRead, W: Write>(
    mut input: R,
    out: &mut W,
    options: &ScanOptions,
) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        outcome.lines_read += 1;
        let line_no = outcome.lines_read;

        let advisory = match LineRecord::parse(line_no, &buf) {
            Ok(LineRecord::Ignored(reason)) => {
                trace!(line = line_no, ?reason, "ignored line");
                outcome.ignored += 1;
                continue;
            }
            Ok(LineRecord::Advisory(advisory)) => advisory,
            Err(err) => {
                tolerate(options, err)?;
                outcome.malformed += 1;
                continue;
            }
        };

        let severity = match advisory.severity() {
            Ok(severity) => severity,
            Err(err) => {
                tolerate(options, err)?;
                outcome.malformed += 1;
                continue;
            }
        };
        let is_critical = severity.is_critical();
        *outcome.by_severity.entry(severity).or_insert(0) += 1;
        if !is_critical {
            continue;
        }

        match advisory.to_critical() {
            Ok(critical) => {
                debug!(
                    line = line_no,
                    module = %critical.module_name,
                    title = %critical.title,
                    "critical advisory"
                );
                write_critical(out, &critical)?;
                outcome.critical.push(critical);
            }
            Err(err) => {
                tolerate(options, err)?;
                outcome.malformed += 1;
                outcome.critical_malformed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Apply the malformed-record policy: return the error unless it may be skipped.
fn tolerate(options: &ScanOptions, err: GateError) -> Result<()> {
    if options.malformed == MalformedPolicy::Skip && err.is_malformed_record() {
        warn!(line = ?err.line(), error = %err, "skipping malformed advisory record");
        Ok(())
    } else {
        Err(err)
    }
}
