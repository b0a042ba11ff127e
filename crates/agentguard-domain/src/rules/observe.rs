//! Observability rules: behavior the configuration does not own up to.

use std::collections::BTreeSet;

use agentguard_types::{CapabilityType, Document, Finding, Severity};

use super::{build_finding, Rule, RuleContext, RuleError, RuleMeta};

pub struct UndeclaredCapability;

static UNDECLARED_CAPABILITY_META: RuleMeta = RuleMeta {
    id: "observe.undeclared_capability",
    group: "observe",
    severity: Severity::Low,
    title: "Capability used but not declared",
    description: "Actions of this type were detected but the policy declares no matching \
                  capability.",
    recommendation: "Declare every capability the document actually uses so reviewers can \
                     compare intent against behavior.",
    tags: &["observability"],
};

impl Rule for UndeclaredCapability {
    fn meta(&self) -> &'static RuleMeta {
        &UNDECLARED_CAPABILITY_META
    }

    fn evaluate(&self, doc: &Document, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let declared: BTreeSet<CapabilityType> =
            ctx.capabilities.declared.iter().copied().collect();

        let mut findings = Vec::new();
        for capability in &doc.capabilities {
            if capability.capability_type == CapabilityType::Unknown {
                continue;
            }
            if declared.contains(&capability.capability_type) {
                continue;
            }
            let Some(&first) = capability.actions.first() else {
                continue;
            };
            let action = &doc.actions[first];
            findings.push(build_finding(
                self.meta(),
                doc,
                action.start_line,
                action.end_line,
                capability.capability_type.as_str(),
                capability.confidence,
                format!(
                    "uses the '{}' capability without declaring it",
                    capability.capability_type.as_str()
                ),
                capability.actions.clone(),
            ));
        }
        Ok(findings)
    }
}

pub struct MissingPermissionsBlock;

static MISSING_PERMISSIONS_META: RuleMeta = RuleMeta {
    id: "observe.missing_permissions_block",
    group: "observe",
    severity: Severity::Low,
    title: "No permission declaration block",
    description: "The document exercises capabilities but contains no textual block \
                  declaring what it is permitted to do.",
    recommendation: "Add a permissions section enumerating the tools, paths and domains the \
                     document relies on.",
    tags: &["observability"],
};

/// Markers a permission-declaration block is recognized by.
const PERMISSION_MARKERS: &[&str] = &["permission", "allowed-tools", "allowed tools", "capabilit"];

/// Document-level confidence for the absence heuristic.
const MISSING_BLOCK_CONFIDENCE: f64 = 0.7;

impl Rule for MissingPermissionsBlock {
    fn meta(&self) -> &'static RuleMeta {
        &MISSING_PERMISSIONS_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        if doc.capabilities.is_empty() {
            return Ok(vec![]);
        }
        let has_block = doc.instruction_blocks.iter().any(|block| {
            let lower = block.to_lowercase();
            PERMISSION_MARKERS.iter().any(|m| lower.contains(m))
        });
        if has_block {
            return Ok(vec![]);
        }

        Ok(vec![build_finding(
            self.meta(),
            doc,
            1,
            1,
            &doc.path,
            MISSING_BLOCK_CONFIDENCE,
            format!(
                "document exercises {} capabilit{} but declares no permissions",
                doc.capabilities.len(),
                if doc.capabilities.len() == 1 { "y" } else { "ies" }
            ),
            vec![],
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_document;
    use crate::rules::testutil::{doc_with, simple_action};
    use agentguard_types::{
        ActionDetail, ActionType, CapabilityOptions, CapabilitySummary, ShellDetail,
    };

    fn ctx<'a>(summary: &'a CapabilitySummary, caps: &'a CapabilityOptions) -> RuleContext<'a> {
        RuleContext {
            all_documents: &[],
            summary,
            capabilities: caps,
            min_confidence: 0.5,
        }
    }

    fn shell_doc() -> agentguard_types::Document {
        let mut doc = doc_with(
            "s.md",
            vec![simple_action(
                ActionType::ShellExec,
                Some(ActionDetail::Shell(ShellDetail {
                    command: "npm test".to_string(),
                    dynamic: false,
                    dynamic_kind: None,
                })),
                0.85,
                2,
            )],
        );
        doc.capabilities = aggregate_document(&doc.actions);
        doc
    }

    #[test]
    fn undeclared_capability_is_flagged() {
        let doc = shell_doc();
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        let findings = UndeclaredCapability.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("shell_exec"));
    }

    #[test]
    fn declared_capability_is_quiet() {
        let doc = shell_doc();
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions {
            declared: vec![CapabilityType::ShellExec],
            ..CapabilityOptions::default()
        };

        assert!(UndeclaredCapability.evaluate(&doc, &ctx(&summary, &caps)).expect("ok").is_empty());
    }

    #[test]
    fn missing_permissions_block_fires_without_marker() {
        let doc = shell_doc();
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        let findings = MissingPermissionsBlock.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn permissions_block_silences_the_rule() {
        let mut doc = shell_doc();
        doc.instruction_blocks.push("Permissions: shell access to npm only.".to_string());
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        assert!(MissingPermissionsBlock.evaluate(&doc, &ctx(&summary, &caps)).expect("ok").is_empty());
    }

    #[test]
    fn capability_free_document_is_quiet() {
        let doc = doc_with("s.md", vec![]);
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        assert!(MissingPermissionsBlock.evaluate(&doc, &ctx(&summary, &caps)).expect("ok").is_empty());
    }
}
