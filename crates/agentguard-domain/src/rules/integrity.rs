//! Instruction-integrity rules.

use agentguard_types::{Document, EvidenceKind, Finding, Severity};

use super::{filesystem_writes, finding_for_action, Rule, RuleContext, RuleError, RuleMeta};

pub struct InstructionOverride;

static INSTRUCTION_OVERRIDE_META: RuleMeta = RuleMeta {
    id: "integrity.instruction_override",
    group: "integrity",
    severity: Severity::High,
    title: "Instruction-override phrase",
    description: "The document carries prompt-injection style language that tries to \
                  override or disable the agent's standing instructions.",
    recommendation: "Remove the phrase; legitimate configuration never needs to countermand \
                     prior instructions.",
    tags: &["integrity", "injection"],
};

impl Rule for InstructionOverride {
    fn meta(&self) -> &'static RuleMeta {
        &INSTRUCTION_OVERRIDE_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(evidence) = action.evidence.first() else {
                continue;
            };
            if evidence.kind != EvidenceKind::OverridePhrase {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("instruction-override phrase: \"{}\"", evidence.value),
            ));
        }
        Ok(findings)
    }
}

pub struct SelfModification;

static SELF_MODIFICATION_META: RuleMeta = RuleMeta {
    id: "integrity.self_modification",
    group: "integrity",
    severity: Severity::High,
    title: "Write into agent configuration",
    description: "A write target falls inside the agent's own configuration directory, \
                  letting a scanned document rewrite the rules that govern it.",
    recommendation: "Agent configuration should only change through reviewed commits, never \
                     through the agent's own tooling.",
    tags: &["integrity", "filesystem"],
};

/// Directory fragments that hold agent configuration.
const CONFIG_DIR_FRAGMENTS: &[&str] = &[".claude/", ".cursor/", ".windsurf/", ".github/"];
const CONFIG_FILE_NAMES: &[&str] = &["CLAUDE.md", "CLAUDE.local.md", "AGENTS.md", ".cursorrules", ".windsurfrules"];

fn targets_agent_config(path: &str) -> bool {
    let normalized = path.replace('\\', "/");
    if CONFIG_DIR_FRAGMENTS.iter().any(|f| normalized.contains(f)) {
        return true;
    }
    let name = normalized.rsplit('/').next().unwrap_or(&normalized);
    CONFIG_FILE_NAMES.contains(&name)
}

impl Rule for SelfModification {
    fn meta(&self) -> &'static RuleMeta {
        &SELF_MODIFICATION_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action, detail) in filesystem_writes(doc) {
            if !targets_agent_config(&detail.path) {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("writes into agent configuration at '{}'", detail.path),
            ));
        }
        Ok(findings)
    }
}
