//! Audit stream record model.
//!
//! Each line of the stream is classified into a [`LineRecord`]. Only records
//! whose `type` is [`AUDIT_ADVISORY`] are inspected further; everything else
//! is [`LineRecord::Ignored`].

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{GateError, Result};

/// Record `type` discriminant for a single advisory.
pub const AUDIT_ADVISORY: &str = "auditAdvisory";

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Advisory severity on the audit tool's scale.
///
/// Matching is exact and case-sensitive: only the string `"critical"` maps to
/// [`Severity::Critical`]. Unknown strings are kept verbatim in
/// [`Severity::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Other(s) => s,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s {
            "info" => Severity::Info,
            "low" => Severity::Low,
            "moderate" => Severity::Moderate,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            other => Severity::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Advisory
// ---------------------------------------------------------------------------

/// The `data.advisory` object of an `auditAdvisory` record.
///
/// Fields are looked up lazily so that a non-critical advisory only needs a
/// `severity`. Every accessor that needs a field reports its absence as
/// [`GateError::MissingField`] tagged with the source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    line: usize,
    fields: Map<String, Value>,
}

impl Advisory {
    pub fn new(line: usize, fields: Map<String, Value>) -> Self {
        Self { line, fields }
    }

    /// 1-based line number this advisory was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The advisory severity.
    ///
    /// A `severity` that is present but not a string (including `null`)
    /// never matches a known level and is returned as [`Severity::Other`]
    /// holding its JSON text. Only an absent key is an error.
    pub fn severity(&self) -> Result<Severity> {
        match self.fields.get("severity") {
            None => Err(self.missing("severity")),
            Some(Value::String(s)) => Ok(Severity::from(s.as_str())),
            Some(other) => Ok(Severity::Other(other.to_string())),
        }
    }

    /// Fetch a required field as display text.
    pub fn require(&self, field: &'static str) -> Result<String> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(value) => Ok(text_of(value)),
        }
    }

    /// The remediation hint, if the advisory carries one.
    pub fn recommendation(&self) -> Option<String> {
        match self.fields.get("recommendation") {
            None | Some(Value::Null) => None,
            Some(value) => Some(text_of(value)),
        }
    }

    /// Extract the report payload, failing on the first missing field.
    pub fn to_critical(&self) -> Result<CriticalAdvisory> {
        Ok(CriticalAdvisory {
            module_name: self.require("module_name")?,
            title: self.require("title")?,
            url: self.require("url")?,
            patched_versions: self.require("patched_versions")?,
            recommendation: self.recommendation(),
        })
    }

    fn missing(&self, field: &'static str) -> GateError {
        GateError::MissingField {
            line: self.line,
            field,
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A critical advisory with every field the report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalAdvisory {
    pub module_name: String,
    pub title: String,
    pub url: String,
    pub patched_versions: String,
    pub recommendation: Option<String>,
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Why a line was skipped without inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not valid JSON, or valid JSON that is not an object.
    NotAnObject,
    /// A JSON object whose `type` is absent or not `auditAdvisory`.
    OtherType,
}

/// One classified input line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineRecord {
    Ignored(IgnoreReason),
    Advisory(Advisory),
}

impl LineRecord {
    /// Classify a raw input line.
    ///
    /// Anything that does not look like an advisory record is
    /// [`LineRecord::Ignored`]. Once the `type` matches, the nested
    /// `data.advisory` object must exist; its absence is an error.
    pub fn parse(line: usize, raw: &[u8]) -> Result<Self> {
        let record: Map<String, Value> = match serde_json::from_slice(raw) {
            Ok(record) => record,
            Err(_) => return Ok(LineRecord::Ignored(IgnoreReason::NotAnObject)),
        };

        if record.get("type").and_then(Value::as_str) != Some(AUDIT_ADVISORY) {
            return Ok(LineRecord::Ignored(IgnoreReason::OtherType));
        }

        let data = nested_object(line, &record, "data", "data")?;
        let advisory = nested_object(line, data, "advisory", "data.advisory")?;
        Ok(LineRecord::Advisory(Advisory::new(line, advisory.clone())))
    }
}

fn nested_object<'a>(
    line: usize,
    parent: &'a Map<String, Value>,
    key: &str,
    path: &'static str,
) -> Result<&'a Map<String, Value>> {
    match parent.get(key) {
        None | Some(Value::Null) => Err(GateError::MissingField { line, field: path }),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(GateError::NotAnObject { line, field: path }),
    }
}
