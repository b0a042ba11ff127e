//! Structural comparison of two scans.
//!
//! Capability transitions are intentionally one-directional: a change is
//! emitted only on a false→true or set-growth transition. Shrinking
//! capabilities never emits anything. New/resolved findings are stable
//! fingerprint set differences in both directions.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use agentguard_types::{
    CapabilitySummary, DiffChange, DiffChangeType, DiffOptions, Finding, GateStatus, GateVerdict,
    Severity, DIFF_REPORT_SCHEMA_V1, OPEN_WRITE_SENTINELS,
};

/// The full diff between a base and a target scan. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiffReport {
    pub schema: String,
    pub changes: Vec<DiffChange>,
    pub new_findings: Vec<Finding>,
    pub resolved_findings: Vec<Finding>,
    pub verdict: GateVerdict,
}

/// Growth-only capability transitions between two summaries.
pub fn diff_summaries(base: &CapabilitySummary, target: &CapabilitySummary) -> Vec<DiffChange> {
    let mut changes = Vec::new();

    let mut flag = |change_type: DiffChangeType,
                    severity: Severity,
                    was: bool,
                    now: bool,
                    message: &str| {
        if !was && now {
            changes.push(DiffChange {
                change_type,
                severity,
                message: message.to_string(),
                details: None,
            });
        }
    };

    flag(
        DiffChangeType::ShellEnabled,
        Severity::Medium,
        base.shell_enabled,
        target.shell_enabled,
        "shell execution is newly enabled",
    );
    flag(
        DiffChangeType::DynamicShellIntroduced,
        Severity::High,
        base.shell_dynamic,
        target.shell_dynamic,
        "dynamic shell execution is newly introduced",
    );
    flag(
        DiffChangeType::NetworkOutboundEnabled,
        Severity::Medium,
        base.net_outbound,
        target.net_outbound,
        "outbound network access is newly enabled",
    );
    flag(
        DiffChangeType::NetworkInboundEnabled,
        Severity::Medium,
        base.net_inbound,
        target.net_inbound,
        "inbound network access is newly enabled",
    );
    flag(
        DiffChangeType::ExecutableFetchEnabled,
        Severity::High,
        base.net_fetches_executable,
        target.net_fetches_executable,
        "fetching of executable content is newly present",
    );
    flag(
        DiffChangeType::HookContextIntroduced,
        Severity::Medium,
        base.has_hooks,
        target.has_hooks,
        "hook-context execution is newly present",
    );
    flag(
        DiffChangeType::CiContextIntroduced,
        Severity::Low,
        base.has_ci_context,
        target.has_ci_context,
        "ci-context execution is newly present",
    );
    flag(
        DiffChangeType::SecretPropagationEnabled,
        Severity::High,
        base.secret_propagation,
        target.secret_propagation,
        "secret values newly propagate to other sinks",
    );

    let new_sensitive: Vec<&String> = target
        .fs_sensitive_paths
        .difference(&base.fs_sensitive_paths)
        .collect();
    if !new_sensitive.is_empty() {
        changes.push(DiffChange {
            change_type: DiffChangeType::SensitivePathAdded,
            severity: Severity::High,
            message: format!("{} new sensitive path(s) touched", new_sensitive.len()),
            details: Some(json!({ "paths": new_sensitive })),
        });
    }

    let base_open = base
        .fs_write_paths
        .iter()
        .any(|p| OPEN_WRITE_SENTINELS.contains(&p.as_str()));
    let target_open: Vec<&String> = target
        .fs_write_paths
        .iter()
        .filter(|p| OPEN_WRITE_SENTINELS.contains(&p.as_str()))
        .collect();
    if !base_open && !target_open.is_empty() {
        changes.push(DiffChange {
            change_type: DiffChangeType::WriteScopeWidened,
            severity: Severity::High,
            message: "write scope widened to a fully-open sentinel".to_string(),
            details: Some(json!({ "sentinels": target_open })),
        });
    }

    let new_secrets: Vec<&String> = target
        .secret_env_vars
        .difference(&base.secret_env_vars)
        .collect();
    if !new_secrets.is_empty() {
        changes.push(DiffChange {
            change_type: DiffChangeType::SecretReferenceAdded,
            severity: Severity::High,
            message: format!("{} new secret variable(s) referenced", new_secrets.len()),
            details: Some(json!({ "variables": new_secrets })),
        });
    }

    changes
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindingsDelta {
    pub new: Vec<Finding>,
    pub resolved: Vec<Finding>,
}

/// Stable-fingerprint set difference in both directions.
pub fn diff_findings(base: &[Finding], target: &[Finding]) -> FindingsDelta {
    let base_fps: BTreeSet<&str> = base.iter().map(|f| f.fingerprints.stable.as_str()).collect();
    let target_fps: BTreeSet<&str> =
        target.iter().map(|f| f.fingerprints.stable.as_str()).collect();

    FindingsDelta {
        new: target
            .iter()
            .filter(|f| !base_fps.contains(f.fingerprints.stable.as_str()))
            .cloned()
            .collect(),
        resolved: base
            .iter()
            .filter(|f| !target_fps.contains(f.fingerprints.stable.as_str()))
            .cloned()
            .collect(),
    }
}

/// Gate evaluation: configured fail change types, then new-high findings,
/// then configured warn change types, then new-medium findings; the first
/// true condition wins.
pub fn evaluate_gate(
    changes: &[DiffChange],
    delta: &FindingsDelta,
    options: &DiffOptions,
) -> GateVerdict {
    if let Some(change) = changes
        .iter()
        .find(|c| options.fail_on.contains(&c.change_type))
    {
        return GateVerdict {
            status: GateStatus::Fail,
            reasons: vec![format!(
                "fail-triggering change: {}",
                change.change_type.as_str()
            )],
        };
    }

    if options.fail_on_new_high {
        let highs = delta.new.iter().filter(|f| f.severity == Severity::High).count();
        if highs > 0 {
            return GateVerdict {
                status: GateStatus::Fail,
                reasons: vec![format!("{highs} new high-severity finding(s)")],
            };
        }
    }

    if let Some(change) = changes
        .iter()
        .find(|c| options.warn_on.contains(&c.change_type))
    {
        return GateVerdict {
            status: GateStatus::Warn,
            reasons: vec![format!(
                "warn-triggering change: {}",
                change.change_type.as_str()
            )],
        };
    }

    if options.warn_on_new_medium {
        let mediums = delta.new.iter().filter(|f| f.severity == Severity::Medium).count();
        if mediums > 0 {
            return GateVerdict {
                status: GateStatus::Warn,
                reasons: vec![format!("{mediums} new medium-severity finding(s)")],
            };
        }
    }

    GateVerdict {
        status: GateStatus::Pass,
        reasons: vec![],
    }
}

/// Compares two (summary, findings) pairs and gates the result.
pub fn diff_scans(
    base_summary: &CapabilitySummary,
    base_findings: &[Finding],
    target_summary: &CapabilitySummary,
    target_findings: &[Finding],
    options: &DiffOptions,
) -> DiffReport {
    let changes = diff_summaries(base_summary, target_summary);
    let delta = diff_findings(base_findings, target_findings);
    let verdict = evaluate_gate(&changes, &delta, options);

    DiffReport {
        schema: DIFF_REPORT_SCHEMA_V1.to_string(),
        changes,
        new_findings: delta.new,
        resolved_findings: delta.resolved,
        verdict,
    }
}
