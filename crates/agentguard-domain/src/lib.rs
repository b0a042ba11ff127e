//! Domain logic: capability aggregation + rule evaluation + fingerprints.
//!
//! This crate is designed to be I/O-free and highly testable.

pub mod aggregate;
pub mod engine;
pub mod fingerprint;
pub mod rules;

pub use aggregate::{aggregate_document, capability_type_for, fold_summary, summarize};
pub use engine::{evaluate_documents, evaluate_with_rules, sort_findings, EngineOutcome};
pub use fingerprint::{fingerprints, normalize_evidence};
pub use rules::{
    build_finding, builtin_rules, finding_for_action, primary_evidence, Rule, RuleContext,
    RuleError, RuleMeta,
};
