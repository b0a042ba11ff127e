//! Secret-handling rules.

use std::collections::BTreeSet;

use agentguard_extract::is_secret_file;
use agentguard_types::{ActionDetail, Document, Finding, Severity};

use super::{finding_for_action, Rule, RuleContext, RuleError, RuleMeta};

pub struct EnvReference;

static ENV_REFERENCE_META: RuleMeta = RuleMeta {
    id: "secrets.env_reference",
    group: "secrets",
    severity: Severity::High,
    title: "Known-secret environment variable referenced",
    description: "The document references an environment variable whose name marks it as \
                  secret material.",
    recommendation: "Keep secrets out of agent-visible configuration; inject them into the \
                     narrow process that needs them.",
    tags: &["secrets"],
};

impl Rule for EnvReference {
    fn meta(&self) -> &'static RuleMeta {
        &ENV_REFERENCE_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        // One finding per variable per document, anchored on the first
        // reference, regardless of how many lines mention it.
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Secrets(detail)) = &action.detail else {
                continue;
            };
            if !seen.insert(detail.variable.as_str()) {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("references secret environment variable '{}'", detail.variable),
            ));
        }
        Ok(findings)
    }
}

pub struct FileAccess;

static FILE_ACCESS_META: RuleMeta = RuleMeta {
    id: "secrets.file_access",
    group: "secrets",
    severity: Severity::High,
    title: "Secret-material file accessed",
    description: "The document touches a file that conventionally holds credentials or keys.",
    recommendation: "Remove the reference; secrets files should never be readable by agent \
                     tooling.",
    tags: &["secrets", "filesystem"],
};

impl Rule for FileAccess {
    fn meta(&self) -> &'static RuleMeta {
        &FILE_ACCESS_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Filesystem(detail)) = &action.detail else {
                continue;
            };
            if !is_secret_file(&detail.path) {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("accesses secret-material file '{}'", detail.path),
            ));
        }
        Ok(findings)
    }
}

pub struct Propagation;

static PROPAGATION_META: RuleMeta = RuleMeta {
    id: "secrets.propagation",
    group: "secrets",
    severity: Severity::High,
    title: "Secret propagated to another sink",
    description: "A secret variable is used on the same line as shell execution, a network \
                  call or a file write, so its value leaves the environment.",
    recommendation: "Never interpolate secrets into commands, URLs or files inside agent \
                     configuration.",
    tags: &["secrets", "exfiltration"],
};

impl Rule for Propagation {
    fn meta(&self) -> &'static RuleMeta {
        &PROPAGATION_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Secrets(detail)) = &action.detail else {
                continue;
            };
            if detail.propagation.is_empty() {
                continue;
            }
            let targets: Vec<&str> = detail
                .propagation
                .iter()
                .map(|t| match t {
                    agentguard_types::PropagationTarget::Shell => "shell",
                    agentguard_types::PropagationTarget::Network => "network",
                    agentguard_types::PropagationTarget::File => "file",
                })
                .collect();
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!(
                    "secret '{}' propagates to {}",
                    detail.variable,
                    targets.join(", ")
                ),
            ));
        }
        Ok(findings)
    }
}
