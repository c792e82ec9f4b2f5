//! Human-readable report text written to standard output.

use std::io::Write;

use crate::advisory::CriticalAdvisory;
use crate::gate::GateVerdict;

/// Placeholder printed when an advisory has no recommendation.
pub const NOT_AVAILABLE: &str = "N/A";

pub const CRITICAL_FOUND_MESSAGE: &str =
    "One or more critical vulnerabilities found! Failing job.";

pub const NO_CRITICAL_MESSAGE: &str = "No critical vulnerabilities found.";

/// Render the report block for one critical advisory.
///
/// Each block starts with an empty line so consecutive blocks stay visually
/// separated in CI logs.
pub fn render_critical(advisory: &CriticalAdvisory) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "CRITICAL: {} - {}\n",
        advisory.module_name, advisory.title
    ));
    out.push_str(&format!("  URL: {}\n", advisory.url));
    out.push_str(&format!("  Patched: {}\n", advisory.patched_versions));
    out.push_str(&format!(
        "  Recommendation: {}\n",
        advisory.recommendation.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    out
}

/// Write the report block for one critical advisory.
pub fn write_critical<W: Write>(out: &mut W, advisory: &CriticalAdvisory) -> std::io::Result<()> {
    out.write_all(render_critical(advisory).as_bytes())
}

/// Render the single summary line closing the report.
pub fn render_summary(verdict: &GateVerdict) -> String {
    if verdict.passed() {
        format!("{}\n", NO_CRITICAL_MESSAGE)
    } else {
        format!("\n{}\n", CRITICAL_FOUND_MESSAGE)
    }
}
