//! Severity-threshold gate.

use agentguard_types::{
    Finding, GateStatus, GateVerdict, PolicyOptions, ScanIssue, ScanIssueKind,
};

/// Computes pass/warn/fail from the post-suppression findings and the
/// accumulated issues. Strict mode escalates parse errors to a fail even
/// with zero findings.
pub fn gate_verdict(findings: &[Finding], issues: &[ScanIssue], policy: &PolicyOptions) -> GateVerdict {
    let mut reasons: Vec<String> = Vec::new();

    let at_or_above = |threshold| findings.iter().filter(|f| f.severity >= threshold).count();

    let failing = at_or_above(policy.fail_threshold);
    let warning = at_or_above(policy.warn_threshold);
    let parse_errors = issues
        .iter()
        .filter(|i| i.kind == ScanIssueKind::Parse)
        .count();

    if failing > 0 {
        reasons.push(format!(
            "{failing} finding(s) at or above {}",
            policy.fail_threshold.as_str()
        ));
    }
    if policy.strict && parse_errors > 0 {
        reasons.push(format!("strict mode: {parse_errors} parse error(s)"));
    }

    let status = if failing > 0 || (policy.strict && parse_errors > 0) {
        GateStatus::Fail
    } else if warning > 0 {
        reasons.push(format!(
            "{warning} finding(s) at or above {}",
            policy.warn_threshold.as_str()
        ));
        GateStatus::Warn
    } else {
        GateStatus::Pass
    };

    GateVerdict { status, reasons }
}
