//! Network rules.

use agentguard_types::{
    ActionDetail, CapabilityType, Document, Finding, NetworkDirection, Severity,
};

use super::{finding_for_action, Rule, RuleContext, RuleError, RuleMeta};

pub struct UndeclaredOutbound;

static UNDECLARED_OUTBOUND_META: RuleMeta = RuleMeta {
    id: "net.undeclared_outbound",
    group: "net",
    severity: Severity::Medium,
    title: "Undeclared outbound network access",
    description: "The document reaches the network without a declared network capability, \
                  or contacts a domain outside the allowlist.",
    recommendation: "Declare the network capability and enumerate the domains the document \
                     actually needs.",
    tags: &["network"],
};

impl Rule for UndeclaredOutbound {
    fn meta(&self) -> &'static RuleMeta {
        &UNDECLARED_OUTBOUND_META
    }

    fn evaluate(&self, doc: &Document, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let declared = ctx
            .capabilities
            .declared
            .contains(&CapabilityType::Network)
            || ctx.capabilities.network_outbound;
        let allowlist = &ctx.capabilities.network_allowlist;

        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Network(detail)) = &action.detail else {
                continue;
            };
            if detail.direction != NetworkDirection::Outbound {
                continue;
            }

            if !declared {
                findings.push(finding_for_action(
                    self.meta(),
                    doc,
                    idx,
                    action,
                    format!(
                        "outbound access to '{}' without a declared network capability",
                        detail.domain.as_deref().unwrap_or("unknown host")
                    ),
                ));
                continue;
            }

            if let Some(domain) = &detail.domain {
                let allowed = allowlist.is_empty()
                    || allowlist.iter().any(|d| domain_matches(domain, d));
                if !allowed {
                    findings.push(finding_for_action(
                        self.meta(),
                        doc,
                        idx,
                        action,
                        format!("domain '{domain}' is not on the declared allowlist"),
                    ));
                }
            }
        }
        Ok(findings)
    }
}

/// `sub.example.com` matches an allowlist entry `example.com`.
fn domain_matches(domain: &str, allowed: &str) -> bool {
    domain == allowed || domain.ends_with(&format!(".{allowed}"))
}

pub struct ExecutableFetch;

static EXECUTABLE_FETCH_META: RuleMeta = RuleMeta {
    id: "net.executable_fetch",
    group: "net",
    severity: Severity::High,
    title: "Fetch of executable content",
    description: "The fetched content is directly runnable; a compromised or moved endpoint \
                  becomes arbitrary code execution.",
    recommendation: "Vendor the script, pin a checksum, or install through a package manager \
                     with signature verification.",
    tags: &["network", "supply-chain"],
};

impl Rule for ExecutableFetch {
    fn meta(&self) -> &'static RuleMeta {
        &EXECUTABLE_FETCH_META
    }

    fn evaluate(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Network(detail)) = &action.detail else {
                continue;
            };
            if !detail.fetches_executable {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!(
                    "fetches executable content from '{}'",
                    detail.url.as_deref().unwrap_or("unknown url")
                ),
            ));
        }
        Ok(findings)
    }
}

pub struct EmptyAllowlist;

static EMPTY_ALLOWLIST_META: RuleMeta = RuleMeta {
    id: "net.empty_allowlist",
    group: "net",
    severity: Severity::Low,
    title: "Outbound access declared with an empty allowlist",
    description: "Network capability is declared but no domains are enumerated, so the \
                  declaration constrains nothing.",
    recommendation: "List the exact domains outbound traffic may reach.",
    tags: &["network"],
};

impl Rule for EmptyAllowlist {
    fn meta(&self) -> &'static RuleMeta {
        &EMPTY_ALLOWLIST_META
    }

    fn evaluate(&self, doc: &Document, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let declared = ctx
            .capabilities
            .declared
            .contains(&CapabilityType::Network)
            || ctx.capabilities.network_outbound;
        if !declared || !ctx.capabilities.network_allowlist.is_empty() {
            return Ok(vec![]);
        }

        let first_outbound = doc.actions.iter().enumerate().find(|(_, a)| {
            matches!(
                &a.detail,
                Some(ActionDetail::Network(d)) if d.direction == NetworkDirection::Outbound
            )
        });
        let Some((idx, action)) = first_outbound else {
            return Ok(vec![]);
        };

        Ok(vec![finding_for_action(
            self.meta(),
            doc,
            idx,
            action,
            "outbound network is declared without any domain allowlist".to_string(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::{doc_with, simple_action};
    use agentguard_types::{ActionType, CapabilityOptions, CapabilitySummary, NetworkDetail};

    fn net_action(domain: &str, executable: bool, line: u32) -> agentguard_types::Action {
        simple_action(
            ActionType::NetworkCall,
            Some(ActionDetail::Network(NetworkDetail {
                url: Some(format!("https://{domain}/x")),
                domain: Some(domain.to_string()),
                direction: NetworkDirection::Outbound,
                fetches_executable: executable,
            })),
            0.8,
            line,
        )
    }

    fn ctx<'a>(summary: &'a CapabilitySummary, caps: &'a CapabilityOptions) -> RuleContext<'a> {
        RuleContext {
            all_documents: &[],
            summary,
            capabilities: caps,
            min_confidence: 0.5,
        }
    }

    #[test]
    fn undeclared_outbound_is_flagged() {
        let doc = doc_with("s.md", vec![net_action("api.example.com", false, 1)]);
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        let findings = UndeclaredOutbound.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("without a declared network capability"));
    }

    #[test]
    fn allowlisted_domain_passes_and_stranger_fails() {
        let doc = doc_with(
            "s.md",
            vec![net_action("api.example.com", false, 1), net_action("evil.io", false, 2)],
        );
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions {
            network_outbound: true,
            network_allowlist: vec!["example.com".to_string()],
            ..CapabilityOptions::default()
        };

        let findings = UndeclaredOutbound.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("evil.io"));
    }

    #[test]
    fn executable_fetch_is_high_severity() {
        let doc = doc_with("s.md", vec![net_action("x.com", true, 3)]);
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        let findings = ExecutableFetch.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn empty_allowlist_fires_once_per_document() {
        let doc = doc_with("s.md", vec![net_action("a.com", false, 1), net_action("b.com", false, 2)]);
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions {
            network_outbound: true,
            ..CapabilityOptions::default()
        };

        let findings = EmptyAllowlist.evaluate(&doc, &ctx(&summary, &caps)).expect("ok");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].start_line, 1);
    }

    #[test]
    fn empty_allowlist_silent_when_undeclared() {
        let doc = doc_with("s.md", vec![net_action("a.com", false, 1)]);
        let summary = CapabilitySummary::default();
        let caps = CapabilityOptions::default();

        assert!(EmptyAllowlist.evaluate(&doc, &ctx(&summary, &caps)).expect("ok").is_empty());
    }
}
