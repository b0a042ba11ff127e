//! Baseline suppression.
//!
//! A baseline is a persisted set of previously-accepted findings, keyed by
//! stable fingerprint. Filtering never mutates the baseline; `update` is
//! append-only, `create` replaces, `prune` drops entries that no longer
//! match anything. The serialized form must round-trip exactly across
//! load→update→save cycles.

use std::collections::BTreeSet;

use agentguard_types::{BaselineEntry, BaselineFile, Finding, BASELINE_SCHEMA_VERSION};

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("invalid baseline JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported baseline version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// Parses a baseline document and checks its version.
pub fn load(json: &str) -> Result<BaselineFile, BaselineError> {
    let baseline: BaselineFile = serde_json::from_str(json)?;
    if baseline.version != BASELINE_SCHEMA_VERSION {
        return Err(BaselineError::Version {
            found: baseline.version,
            expected: BASELINE_SCHEMA_VERSION,
        });
    }
    Ok(baseline)
}

/// Serializes a baseline. Stable field order + trailing newline so repeated
/// save cycles are byte-identical.
pub fn save(baseline: &BaselineFile) -> String {
    let mut out = serde_json::to_string_pretty(baseline).expect("baseline serializes");
    out.push('\n');
    out
}

/// Result of filtering current findings against a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Findings that survive suppression.
    pub kept: Vec<Finding>,
    /// How many current findings the baseline suppressed.
    pub suppressed: u32,
    /// How many current findings are not in the baseline.
    pub new_findings: u32,
    /// Baseline entries matching no current finding (informational).
    pub fixed: Vec<BaselineEntry>,
}

/// Suppress current findings whose stable fingerprint is baselined.
pub fn filter_findings(baseline: &BaselineFile, current: &[Finding]) -> FilterOutcome {
    let accepted: BTreeSet<&str> = baseline
        .findings
        .iter()
        .map(|e| e.fingerprint.as_str())
        .collect();
    let current_fps: BTreeSet<&str> = current
        .iter()
        .map(|f| f.fingerprints.stable.as_str())
        .collect();

    let mut kept = Vec::new();
    let mut suppressed = 0u32;
    for finding in current {
        if accepted.contains(finding.fingerprints.stable.as_str()) {
            suppressed += 1;
        } else {
            kept.push(finding.clone());
        }
    }

    let fixed: Vec<BaselineEntry> = baseline
        .findings
        .iter()
        .filter(|e| !current_fps.contains(e.fingerprint.as_str()))
        .cloned()
        .collect();

    FilterOutcome {
        new_findings: kept.len() as u32,
        kept,
        suppressed,
        fixed,
    }
}

fn entry_for(finding: &Finding, now: &str) -> BaselineEntry {
    BaselineEntry {
        rule_id: finding.rule_id.clone(),
        path: finding.path.clone(),
        fingerprint: finding.fingerprints.stable.clone(),
        baselined_at: now.to_string(),
        reason: None,
    }
}

/// Append-only: adds current fingerprints not yet present; existing entries
/// (including their timestamps and reasons) are untouched.
pub fn update(baseline: &BaselineFile, current: &[Finding], now: &str) -> BaselineFile {
    let mut known: BTreeSet<String> = baseline
        .findings
        .iter()
        .map(|e| e.fingerprint.clone())
        .collect();

    let mut findings = baseline.findings.clone();
    for finding in current {
        if known.insert(finding.fingerprints.stable.clone()) {
            findings.push(entry_for(finding, now));
        }
    }

    BaselineFile {
        version: baseline.version,
        created_at: baseline.created_at.clone(),
        updated_at: now.to_string(),
        findings,
    }
}

/// Replaces the entire baseline with the current findings.
pub fn create(current: &[Finding], now: &str) -> BaselineFile {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let findings = current
        .iter()
        .filter(|f| seen.insert(f.fingerprints.stable.as_str()))
        .map(|f| entry_for(f, now))
        .collect();

    BaselineFile {
        version: BASELINE_SCHEMA_VERSION,
        created_at: now.to_string(),
        updated_at: now.to_string(),
        findings,
    }
}

/// Drops entries whose fingerprint matches no current finding.
pub fn prune(baseline: &BaselineFile, current: &[Finding], now: &str) -> BaselineFile {
    let current_fps: BTreeSet<&str> = current
        .iter()
        .map(|f| f.fingerprints.stable.as_str())
        .collect();

    BaselineFile {
        version: baseline.version,
        created_at: baseline.created_at.clone(),
        updated_at: now.to_string(),
        findings: baseline
            .findings
            .iter()
            .filter(|e| current_fps.contains(e.fingerprint.as_str()))
            .cloned()
            .collect(),
    }
}
