//! Rule contract and builtin registry.
//!
//! Every rule is a small unit sharing one evaluate contract, held in an
//! ordered registry. Rules are a closed set of plain structs, not a class
//! hierarchy; shared extraction helpers live in agentguard-extract and in
//! this module's free functions.

use agentguard_types::{
    Action, ActionDetail, CapabilityOptions, CapabilitySummary, Document, FilesystemDetail,
    Finding, Severity,
};

use crate::fingerprint::fingerprints;

pub mod fs;
pub mod integrity;
pub mod net;
pub mod observe;
pub mod scope;
pub mod secrets;
pub mod shell;

/// Fixed metadata every rule exposes.
#[derive(Debug, Clone, Copy)]
pub struct RuleMeta {
    pub id: &'static str,
    pub group: &'static str,
    pub severity: Severity,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub tags: &'static [&'static str],
}

/// Read-only inputs shared by all evaluations of one scan.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub all_documents: &'a [Document],
    pub summary: &'a CapabilitySummary,
    pub capabilities: &'a CapabilityOptions,
    /// Central gate value; rules may pre-filter defensively but the engine's
    /// gate is the contract of record.
    pub min_confidence: f64,
}

#[derive(Debug, thiserror::Error)]
#[error("rule '{rule_id}' failed: {message}")]
pub struct RuleError {
    pub rule_id: String,
    pub message: String,
}

pub trait Rule: Send + Sync {
    fn meta(&self) -> &'static RuleMeta;

    fn evaluate(&self, doc: &Document, ctx: &RuleContext<'_>)
        -> Result<Vec<Finding>, RuleError>;
}

/// The ordered builtin registry. Order only affects evaluation sequence;
/// output order is fixed by the engine's final sort.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(shell::DynamicExec),
        Box::new(shell::HookSideEffect),
        Box::new(shell::AutoTriggeredHook),
        Box::new(fs::UnscopedWrite),
        Box::new(fs::SensitivePath),
        Box::new(fs::BoundaryEscape),
        Box::new(net::UndeclaredOutbound),
        Box::new(net::ExecutableFetch),
        Box::new(net::EmptyAllowlist),
        Box::new(secrets::EnvReference),
        Box::new(secrets::FileAccess),
        Box::new(secrets::Propagation),
        Box::new(integrity::InstructionOverride),
        Box::new(integrity::SelfModification),
        Box::new(scope::RemoteCodeExecution),
        Box::new(scope::BroadWrite),
        Box::new(observe::UndeclaredCapability),
        Box::new(observe::MissingPermissionsBlock),
    ]
}

/// Builds a finding with its fingerprints computed up front. Severity
/// overrides applied later do not touch any fingerprint input.
#[allow(clippy::too_many_arguments)]
pub fn build_finding(
    meta: &RuleMeta,
    doc: &Document,
    start_line: u32,
    end_line: u32,
    evidence: &str,
    confidence: f64,
    message: String,
    related_actions: Vec<usize>,
) -> Finding {
    Finding {
        rule_id: meta.id.to_string(),
        group: meta.group.to_string(),
        severity: meta.severity,
        confidence,
        message,
        evidence: evidence.to_string(),
        path: doc.path.clone(),
        start_line,
        end_line,
        related_actions,
        fingerprints: fingerprints(meta.id, &doc.path, start_line, end_line, evidence),
    }
}

/// Convenience for rules anchored on one action.
pub fn finding_for_action(
    meta: &RuleMeta,
    doc: &Document,
    idx: usize,
    action: &Action,
    message: String,
) -> Finding {
    build_finding(
        meta,
        doc,
        action.start_line,
        action.end_line,
        primary_evidence(action),
        action.confidence(),
        message,
        vec![idx],
    )
}

/// The raw value of an action's strongest evidence entry.
pub fn primary_evidence(action: &Action) -> &str {
    action
        .evidence
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|e| e.value.as_str())
        .unwrap_or("")
}

/// Iterate filesystem-write actions with their detail blocks.
pub fn filesystem_writes<'a>(
    doc: &'a Document,
) -> impl Iterator<Item = (usize, &'a Action, &'a FilesystemDetail)> {
    doc.actions.iter().enumerate().filter_map(|(idx, action)| {
        match &action.detail {
            Some(ActionDetail::Filesystem(d)) if d.write => Some((idx, action, d)),
            _ => None,
        }
    })
}
