//! End-to-end gating over realistic `yarn audit --json` streams.

use audit_gate_core::{
    run_gate, GateError, MalformedPolicy, ScanOptions, EXIT_CRITICAL, EXIT_PASS,
};
use serde_json::{json, Value};

fn advisory_record(severity: &str, module: &str, recommendation: Option<&str>) -> Value {
    let mut advisory = json!({
        "findings": [{ "version": "1.0.0", "paths": [module] }],
        "id": 1005365,
        "severity": severity,
        "module_name": module,
        "title": "Prototype Pollution",
        "url": format!("https://github.com/advisories/{module}"),
        "vulnerable_versions": "<1.2.0",
        "patched_versions": ">=1.2.0",
    });
    if let Some(r) = recommendation {
        advisory["recommendation"] = json!(r);
    }
    json!({
        "type": "auditAdvisory",
        "data": { "resolution": { "id": 1005365, "path": module, "dev": false }, "advisory": advisory }
    })
}

fn summary_record() -> Value {
    json!({
        "type": "auditSummary",
        "data": {
            "vulnerabilities": { "info": 0, "low": 1, "moderate": 0, "high": 0, "critical": 1 },
            "dependencies": 412
        }
    })
}

fn stream(records: &[Value]) -> String {
    records
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn gate(input: &str, options: &ScanOptions) -> (Result<u8, GateError>, String) {
    let mut out = Vec::new();
    let result = run_gate(input.as_bytes(), &mut out, options).map(|v| v.exit_code());
    (result, String::from_utf8(out).expect("utf8 output"))
}

// ---- Passing streams ----

#[test]
fn empty_stream_passes() {
    let (code, out) = gate("", &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
    assert_eq!(out, "No critical vulnerabilities found.\n");
}

#[test]
fn noise_lines_are_ignored() {
    let input = "yarn audit v1.22.19\n\n{\"type\":\"auditAdvisory\",\"data\":\nnot json at all\n";
    let (code, out) = gate(input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
    assert_eq!(out, "No critical vulnerabilities found.\n");
}

#[test]
fn non_critical_advisories_pass_silently() {
    let input = stream(&[
        advisory_record("low", "minimist", None),
        advisory_record("moderate", "lodash", None),
        advisory_record("high", "node-fetch", None),
        summary_record(),
    ]);
    let (code, out) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
    assert_eq!(out, "No critical vulnerabilities found.\n");
}

#[test]
fn critical_severity_on_other_types_is_ignored() {
    let input = stream(&[
        json!({ "type": "auditAction", "data": { "advisory": { "severity": "critical" } } }),
        json!({ "type": "info", "severity": "critical" }),
    ]);
    let (code, _) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
}

#[test]
fn severity_match_is_case_sensitive() {
    let input = stream(&[advisory_record("CRITICAL", "left-pad", None)]);
    let (code, _) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
}

// ---- Failing streams ----

#[test]
fn single_critical_advisory_fails() {
    let input = r#"{"type":"auditAdvisory","data":{"advisory":{"severity":"critical","module_name":"left-pad","title":"Prototype Pollution","url":"http://x","patched_versions":">=1.2.0"}}}"#;
    let (code, out) = gate(input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_CRITICAL);
    assert_eq!(
        out,
        "\nCRITICAL: left-pad - Prototype Pollution\n  URL: http://x\n  Patched: >=1.2.0\n  Recommendation: N/A\n\nOne or more critical vulnerabilities found! Failing job.\n"
    );
}

#[test]
fn one_block_per_critical_advisory() {
    let input = stream(&[
        advisory_record("critical", "minimist", Some("Upgrade to version 1.2.6 or later")),
        advisory_record("low", "debug", None),
        advisory_record("critical", "shell-quote", None),
        summary_record(),
    ]);
    let (code, out) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_CRITICAL);
    assert_eq!(out.matches("CRITICAL: ").count(), 2);
    assert!(out.contains("CRITICAL: minimist - Prototype Pollution"));
    assert!(out.contains("  URL: https://github.com/advisories/minimist"));
    assert!(out.contains("  Patched: >=1.2.0"));
    assert!(out.contains("  Recommendation: Upgrade to version 1.2.6 or later"));
    assert!(out.contains("CRITICAL: shell-quote - Prototype Pollution"));
    assert!(out.contains("  Recommendation: N/A"));
    assert!(!out.contains("debug"));
    assert!(out.ends_with("One or more critical vulnerabilities found! Failing job.\n"));
}

#[test]
fn critical_after_noise_still_fails() {
    let input = format!(
        "garbage\n{}\n\n",
        advisory_record("critical", "left-pad", None)
    );
    let (code, _) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_CRITICAL);
}

// ---- Malformed advisory records ----

#[test]
fn malformed_advisory_aborts_by_default() {
    let input = stream(&[
        advisory_record("low", "debug", None),
        json!({ "type": "auditAdvisory", "data": { "advisory": { "severity": "critical", "module_name": "x" } } }),
    ]);
    let (result, out) = gate(&input, &ScanOptions::default());
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        GateError::MissingField {
            line: 2,
            field: "title"
        }
    ));
    assert!(!out.contains("No critical vulnerabilities found."));
}

#[test]
fn malformed_advisory_skipped_on_request() {
    let input = stream(&[
        json!({ "type": "auditAdvisory", "data": null }),
        advisory_record("moderate", "debug", None),
    ]);
    let options = ScanOptions::default().with_malformed(MalformedPolicy::Skip);
    let (code, out) = gate(&input, &options);
    assert_eq!(code.unwrap(), EXIT_PASS);
    assert_eq!(out, "No critical vulnerabilities found.\n");
}

#[test]
fn skipped_malformed_critical_still_fails_the_job() {
    let input = stream(&[json!({
        "type": "auditAdvisory",
        "data": { "advisory": {
            "severity": "critical",
            "module_name": "left-pad",
            "title": "Prototype Pollution",
            "patched_versions": ">=1.2.0"
        } }
    })]);
    let options = ScanOptions::default().with_malformed(MalformedPolicy::Skip);
    let (code, out) = gate(&input, &options);
    assert_eq!(code.unwrap(), EXIT_CRITICAL);
    assert!(!out.contains("CRITICAL: "));
    assert_eq!(
        out,
        "\nOne or more critical vulnerabilities found! Failing job.\n"
    );
}

#[test]
fn null_severity_is_read_and_ignored() {
    let input = stream(&[json!({
        "type": "auditAdvisory",
        "data": { "advisory": { "severity": null, "module_name": "a" } }
    })]);
    let (code, out) = gate(&input, &ScanOptions::default());
    assert_eq!(code.unwrap(), EXIT_PASS);
    assert_eq!(out, "No critical vulnerabilities found.\n");
}
