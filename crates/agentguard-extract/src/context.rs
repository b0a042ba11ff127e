//! Execution-context resolution.

use agentguard_types::{ContextProfile, DocKind, ExecutionContext};

/// Trigger names that place a document in CI context.
pub const CI_TRIGGERS: &[&str] = &["ci", "push", "pull_request", "schedule", "workflow_dispatch"];

/// Hook documents default to hook context; everything else is interactive
/// unless explicit trigger metadata says CI.
pub fn resolve_context(kind: DocKind, triggers: Vec<String>) -> ContextProfile {
    let primary = if kind == DocKind::Hook {
        ExecutionContext::Hook
    } else if triggers.iter().any(|t| CI_TRIGGERS.contains(&t.as_str())) {
        ExecutionContext::Ci
    } else {
        ExecutionContext::Interactive
    };
    ContextProfile { primary, triggers }
}
