//! audit-gate core library
//!
//! Scans the JSON Lines stream produced by `yarn audit --json` and decides
//! whether a CI job must fail because a critical advisory is present.
//!
//! The pass is strictly linear: every line is classified with
//! [`LineRecord::parse`], critical advisories are reported as they are seen,
//! and the accumulated [`ScanOutcome`] is turned into a [`GateVerdict`] once
//! the input is exhausted.
//!
//! ```
//! use audit_gate_core::{run_gate, ScanOptions};
//!
//! let input = br#"{"type":"auditSummary","data":{}}"#;
//! let mut out = Vec::new();
//! let verdict = run_gate(&input[..], &mut out, &ScanOptions::default()).unwrap();
//!
//! assert!(verdict.passed());
//! assert_eq!(String::from_utf8(out).unwrap(), "No critical vulnerabilities found.\n");
//! ```

pub mod advisory;
pub mod error;
pub mod gate;
pub mod report;
pub mod scan;
pub mod telemetry;

pub use advisory::{Advisory, CriticalAdvisory, IgnoreReason, LineRecord, Severity, AUDIT_ADVISORY};
pub use error::{GateError, Result};
pub use gate::{run_gate, GateVerdict, EXIT_ABORTED, EXIT_CRITICAL, EXIT_PASS};
pub use report::{
    render_critical, render_summary, write_critical, CRITICAL_FOUND_MESSAGE, NOT_AVAILABLE,
    NO_CRITICAL_MESSAGE,
};
pub use scan::{scan_stream, MalformedPolicy, ScanOptions, ScanOutcome};
pub use telemetry::init_tracing;
