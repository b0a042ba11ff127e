//! Data types (documents, actions, findings, config) for agentguard.
//!
//! This crate is intentionally "dumb": pure DTOs with serde + schemars.
//! All analysis logic lives in the extract/domain crates.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema Identifiers ─────────────────────────────────────────
pub const SCAN_REPORT_SCHEMA_V1: &str = "agentguard.scan.v1";
pub const BASELINE_SCHEMA_VERSION: u32 = 1;
pub const DIFF_REPORT_SCHEMA_V1: &str = "agentguard.diff.v1";

// ── Exit codes (CLI contract) ──────────────────────────────────
pub const EXIT_PASS: i32 = 0;
pub const EXIT_FAIL: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CONFIG: i32 = 3;
pub const EXIT_PARSE: i32 = 4;
pub const EXIT_INTERNAL: i32 = 5;

/// Maximum number of example shell commands retained in the capability summary.
pub const MAX_SHELL_EXAMPLES: usize = 5;

/// Glob sentinels that make a write scope fully open.
pub const OPEN_WRITE_SENTINELS: &[&str] = &["**/*", "**", "*", "./"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ShellExec,
    FileRead,
    FileWrite,
    NetworkCall,
    GitOperation,
    Unknown,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::ShellExec => "shell_exec",
            ActionType::FileRead => "file_read",
            ActionType::FileWrite => "file_write",
            ActionType::NetworkCall => "network_call",
            ActionType::GitOperation => "git_operation",
            ActionType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    Interactive,
    Hook,
    Ci,
    Unknown,
}

impl ExecutionContext {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionContext::Interactive => "interactive",
            ExecutionContext::Hook => "hook",
            ExecutionContext::Ci => "ci",
            ExecutionContext::Unknown => "unknown",
        }
    }
}

/// The kind of configuration artifact a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Skill,
    Agent,
    Hook,
    Rules,
    Memory,
    Unknown,
}

impl DocKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocKind::Skill => "skill",
            DocKind::Agent => "agent",
            DocKind::Hook => "hook",
            DocKind::Rules => "rules",
            DocKind::Memory => "memory",
            DocKind::Unknown => "unknown",
        }
    }
}

/// Which agent tooling ecosystem a file belongs to, decided by path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    Claude,
    Cursor,
    Copilot,
    Windsurf,
    Generic,
}

impl ToolFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolFamily::Claude => "claude",
            ToolFamily::Cursor => "cursor",
            ToolFamily::Copilot => "copilot",
            ToolFamily::Windsurf => "windsurf",
            ToolFamily::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocFormat {
    Markdown,
    Shell,
    Json,
    Yaml,
    Toml,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Ok,
    Partial,
    Failed,
}

impl ParseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseStatus::Ok => "ok",
            ParseStatus::Partial => "partial",
            ParseStatus::Failed => "failed",
        }
    }
}

/// How a piece of evidence was detected. Each kind carries a method-fixed
/// confidence; confidences are never learned or tuned per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    DynamicPattern,
    CommandToken,
    FencedBlock,
    Narrative,
    EnvReference,
    PathFragment,
    UrlReference,
    OverridePhrase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    pub kind: EvidenceKind,
    /// Raw matched text, untrimmed.
    pub value: String,
    /// Method-fixed confidence in [0, 1].
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DynamicShellKind {
    RemotePipe,
    Eval,
    Interpolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShellDetail {
    pub command: String,
    pub dynamic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_kind: Option<DynamicShellKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NetworkDirection {
    Outbound,
    Inbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub direction: NetworkDirection,
    pub fetches_executable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilesystemDetail {
    pub path: String,
    pub write: bool,
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GitDetail {
    /// Subcommand-level operation, e.g. "push", "commit", "config".
    pub operation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropagationTarget {
    Shell,
    Network,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecretsDetail {
    /// Environment variable name as written (upper-cased for matching).
    pub variable: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub propagation: Vec<PropagationTarget>,
}

/// Type-specific payload attached to an [`Action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetail {
    Shell(ShellDetail),
    Network(NetworkDetail),
    Filesystem(FilesystemDetail),
    Git(GitDetail),
    Secrets(SecretsDetail),
}

/// One detected behavior instance. Invariant: `evidence` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub context: ExecutionContext,
    pub start_line: u32,
    pub end_line: u32,
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ActionDetail>,
}

impl Action {
    /// Highest evidence confidence, 0.0 for a (malformed) evidence-free action.
    pub fn confidence(&self) -> f64 {
        self.evidence
            .iter()
            .map(|e| e.confidence)
            .fold(0.0_f64, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    Filesystem,
    ShellExec,
    Network,
    Secrets,
    Git,
    Unknown,
}

impl CapabilityType {
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityType::Filesystem => "filesystem",
            CapabilityType::ShellExec => "shell_exec",
            CapabilityType::Network => "network",
            CapabilityType::Secrets => "secrets",
            CapabilityType::Git => "git",
            CapabilityType::Unknown => "unknown",
        }
    }
}

/// Scope details unioned from the actions contributing to a capability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityScope {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<String>,
}

/// Per-document aggregation bucket for one capability type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Capability {
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,
    pub scope: CapabilityScope,
    /// Indices into the owning document's action list.
    pub actions: Vec<usize>,
    /// Max over contributing action confidences.
    pub confidence: f64,
}

/// Scan-wide reduction of all capabilities across all documents.
///
/// All set-valued fields use set semantics; all booleans are monotonic OR.
/// Re-aggregating an already-aggregated summary with the same inputs yields
/// the same result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapabilitySummary {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fs_read_paths: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fs_write_paths: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub fs_sensitive_paths: BTreeSet<String>,

    #[serde(default)]
    pub shell_enabled: bool,
    #[serde(default)]
    pub shell_dynamic: bool,
    /// Up to [`MAX_SHELL_EXAMPLES`] example commands, first seen wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shell_examples: Vec<String>,

    #[serde(default)]
    pub net_outbound: bool,
    #[serde(default)]
    pub net_inbound: bool,
    #[serde(default)]
    pub net_fetches_executable: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub net_domains: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub secret_env_vars: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub secret_files: BTreeSet<String>,
    #[serde(default)]
    pub secret_propagation: bool,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub git_operations: BTreeSet<String>,

    #[serde(default)]
    pub has_hooks: bool,
    #[serde(default)]
    pub has_ci_context: bool,
}

/// Declared context of a document: where its instructions run, and what
/// triggers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContextProfile {
    pub primary: ExecutionContext,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
}

impl Default for ContextProfile {
    fn default() -> Self {
        Self {
            primary: ExecutionContext::Interactive,
            triggers: vec![],
        }
    }
}

/// One parsed configuration file. Immutable after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    pub path: String,
    pub tool_family: ToolFamily,
    pub kind: DocKind,
    pub format: DocFormat,
    /// `sha256:` + 16 hex chars over the raw content.
    pub content_hash: String,
    pub parse_status: ParseStatus,
    pub parse_confidence: f64,
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
    pub context: ContextProfile,
    /// Prose blocks carrying instructions (scanned for override phrases).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruction_blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

/// Deterministic identity hashes for a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FingerprintSet {
    /// hash(rule_id, path, start_line, normalized evidence) — primary identity.
    pub stable: String,
    /// hash(rule_id, path, start_line, end_line) — tolerant of evidence drift.
    pub location: String,
    /// hash(rule_id, normalized evidence) — tolerant of location drift.
    pub content: String,
}

/// Immutable output of one rule evaluation against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub rule_id: String,
    pub group: String,
    pub severity: Severity,
    pub confidence: f64,
    pub message: String,
    pub evidence: String,
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_actions: Vec<usize>,
    pub fingerprints: FingerprintSet,
}

// ── Diff types ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiffChangeType {
    ShellEnabled,
    DynamicShellIntroduced,
    NetworkOutboundEnabled,
    NetworkInboundEnabled,
    ExecutableFetchEnabled,
    HookContextIntroduced,
    CiContextIntroduced,
    SensitivePathAdded,
    WriteScopeWidened,
    SecretReferenceAdded,
    SecretPropagationEnabled,
}

impl DiffChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffChangeType::ShellEnabled => "shell_enabled",
            DiffChangeType::DynamicShellIntroduced => "dynamic_shell_introduced",
            DiffChangeType::NetworkOutboundEnabled => "network_outbound_enabled",
            DiffChangeType::NetworkInboundEnabled => "network_inbound_enabled",
            DiffChangeType::ExecutableFetchEnabled => "executable_fetch_enabled",
            DiffChangeType::HookContextIntroduced => "hook_context_introduced",
            DiffChangeType::CiContextIntroduced => "ci_context_introduced",
            DiffChangeType::SensitivePathAdded => "sensitive_path_added",
            DiffChangeType::WriteScopeWidened => "write_scope_widened",
            DiffChangeType::SecretReferenceAdded => "secret_reference_added",
            DiffChangeType::SecretPropagationEnabled => "secret_propagation_enabled",
        }
    }
}

/// A behavioral-expansion change between two scans. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiffChange {
    #[serde(rename = "type")]
    pub change_type: DiffChangeType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ── Baseline persisted format ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BaselineEntry {
    pub rule_id: String,
    pub path: String,
    /// Stable fingerprint, including the algorithm tag.
    pub fingerprint: String,
    pub baselined_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The persisted baseline file. Must round-trip exactly across
/// load→update→save cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BaselineFile {
    pub version: u32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub findings: Vec<BaselineEntry>,
}

// ── Verdict & report types ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Warn,
    Fail,
}

impl GateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Pass => "pass",
            GateStatus::Warn => "warn",
            GateStatus::Fail => "fail",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            GateStatus::Pass | GateStatus::Warn => EXIT_PASS,
            GateStatus::Fail => EXIT_FAIL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GateVerdict {
    pub status: GateStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

/// Accumulated per-document / per-rule issue, returned beside normal results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanIssue {
    pub kind: ScanIssueKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanIssueKind {
    Parse,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSummary {
    pub path: String,
    pub content_hash: String,
    pub parse_status: ParseStatus,
    pub actions: u32,
    pub capabilities: u32,
}

/// Least-privilege permission recommendation derived from a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PermissionManifest {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub write_paths: BTreeSet<String>,
    pub shell: bool,
    pub network: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub network_domains: BTreeSet<String>,
    /// Always recommended empty; present so renderers show the field.
    #[serde(default)]
    pub secrets: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Counters describing how a loaded baseline applied to this scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BaselineStats {
    pub suppressed: u32,
    pub new_findings: u32,
    pub fixed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScanReport {
    pub schema: String,
    pub tool: ToolMeta,
    pub documents: Vec<DocumentSummary>,
    pub findings: Vec<Finding>,
    pub summary: CapabilitySummary,
    pub manifest: PermissionManifest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ScanIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineStats>,
    pub verdict: GateVerdict,
}

// ── Policy / configuration ─────────────────────────────────────

fn default_min_confidence() -> f64 {
    0.5
}

fn default_fail_threshold() -> Severity {
    Severity::High
}

fn default_warn_threshold() -> Severity {
    Severity::Medium
}

fn default_max_files() -> usize {
    5_000
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanOptions {
    /// Static circuit breaker: scans over larger pre-enumerated file sets
    /// are rejected before extraction begins.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            include: vec![],
            exclude: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyOptions {
    /// Findings strictly below this confidence are dropped by the engine.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_fail_threshold")]
    pub fail_threshold: Severity,
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: Severity,
    /// Escalate accumulated parse errors to an overall fail verdict.
    #[serde(default)]
    pub strict: bool,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            fail_threshold: default_fail_threshold(),
            warn_threshold: default_warn_threshold(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RuleOptions {
    /// Rule ids skipped entirely (no evaluate call).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
    /// Per-rule severity replacement, applied before the confidence gate.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub severity_overrides: BTreeMap<String, Severity>,
}

/// Capabilities the repository declares it intends to use. Rules compare
/// observed behavior against these declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declared: Vec<CapabilityType>,
    /// Domains outbound network access is allowed to reach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_allowlist: Vec<String>,
    /// Whether outbound network access is declared at all.
    #[serde(default)]
    pub network_outbound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiffOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_on: Vec<DiffChangeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warn_on: Vec<DiffChangeType>,
    #[serde(default = "default_true")]
    pub fail_on_new_high: bool,
    #[serde(default = "default_true")]
    pub warn_on_new_medium: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            fail_on: vec![],
            warn_on: vec![],
            fail_on_new_high: true,
            warn_on_new_medium: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BaselineOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}

/// The full policy object. The core reads these values; parsing and
/// validating the backing file is the CLI's job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditConfig {
    #[serde(default)]
    pub scan: ScanOptions,
    #[serde(default)]
    pub policy: PolicyOptions,
    #[serde(default)]
    pub rules: RuleOptions,
    #[serde(default)]
    pub capabilities: CapabilityOptions,
    #[serde(default)]
    pub diff: DiffOptions,
    #[serde(default)]
    pub baseline: BaselineOptions,
    #[serde(default)]
    pub output: OutputOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_high() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn enum_string_forms() {
        assert_eq!(Severity::High.as_str(), "high");
        assert_eq!(ActionType::ShellExec.as_str(), "shell_exec");
        assert_eq!(ExecutionContext::Hook.as_str(), "hook");
        assert_eq!(DocKind::Skill.as_str(), "skill");
        assert_eq!(CapabilityType::Network.as_str(), "network");
        assert_eq!(GateStatus::Fail.as_str(), "fail");
        assert_eq!(
            DiffChangeType::DynamicShellIntroduced.as_str(),
            "dynamic_shell_introduced"
        );
    }

    #[test]
    fn gate_status_exit_codes() {
        assert_eq!(GateStatus::Pass.exit_code(), EXIT_PASS);
        assert_eq!(GateStatus::Warn.exit_code(), EXIT_PASS);
        assert_eq!(GateStatus::Fail.exit_code(), EXIT_FAIL);
    }

    #[test]
    fn action_confidence_is_max_over_evidence() {
        let action = Action {
            action_type: ActionType::ShellExec,
            context: ExecutionContext::Interactive,
            start_line: 1,
            end_line: 1,
            evidence: vec![
                Evidence {
                    kind: EvidenceKind::CommandToken,
                    value: "curl".to_string(),
                    confidence: 0.85,
                },
                Evidence {
                    kind: EvidenceKind::Narrative,
                    value: "run curl".to_string(),
                    confidence: 0.6,
                },
            ],
            detail: None,
        };
        assert_eq!(action.confidence(), 0.85);
    }

    #[test]
    fn audit_config_defaults() {
        let cfg = AuditConfig::default();
        assert_eq!(cfg.policy.min_confidence, 0.5);
        assert_eq!(cfg.policy.fail_threshold, Severity::High);
        assert_eq!(cfg.policy.warn_threshold, Severity::Medium);
        assert_eq!(cfg.scan.max_files, 5_000);
        assert!(cfg.diff.fail_on_new_high);
        assert!(cfg.diff.warn_on_new_medium);
        assert!(!cfg.policy.strict);
    }

    #[test]
    fn audit_config_parses_from_partial_json() {
        let cfg: AuditConfig =
            serde_json::from_str(r#"{"policy": {"min_confidence": 0.8}}"#).expect("parse");
        assert_eq!(cfg.policy.min_confidence, 0.8);
        assert_eq!(cfg.policy.fail_threshold, Severity::High);
    }

    #[test]
    fn baseline_file_round_trips() {
        let baseline = BaselineFile {
            version: BASELINE_SCHEMA_VERSION,
            created_at: "2025-11-02T10:00:00Z".to_string(),
            updated_at: "2025-11-02T10:00:00Z".to_string(),
            findings: vec![BaselineEntry {
                rule_id: "shell.dynamic_exec".to_string(),
                path: ".claude/skills/deploy/SKILL.md".to_string(),
                fingerprint: "sha256:0011223344556677".to_string(),
                baselined_at: "2025-11-02T10:00:00Z".to_string(),
                reason: Some("accepted for release tooling".to_string()),
            }],
        };

        let json = serde_json::to_string_pretty(&baseline).expect("serialize");
        let back: BaselineFile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(baseline, back);
    }

    #[test]
    fn capability_summary_default_is_empty() {
        let summary = CapabilitySummary::default();
        assert!(!summary.shell_enabled);
        assert!(!summary.has_hooks);
        assert!(summary.fs_write_paths.is_empty());
        assert!(summary.net_domains.is_empty());
    }
}
