//! Filesystem-write rules.

use agentguard_types::{Document, Finding, Severity, OPEN_WRITE_SENTINELS};

use super::{filesystem_writes, finding_for_action, Rule, RuleContext, RuleError, RuleMeta};

pub struct UnscopedWrite;

static UNSCOPED_WRITE_META: RuleMeta = RuleMeta {
    id: "fs.unscoped_write",
    group: "fs",
    severity: Severity::High,
    title: "Unscoped filesystem write",
    description: "A write target uses a fully-open glob sentinel, granting write access to \
                  the entire tree.",
    recommendation: "Scope writes to the narrowest directory that still works.",
    tags: &["filesystem"],
};

impl Rule for UnscopedWrite {
    fn meta(&self) -> &'static RuleMeta {
        &UNSCOPED_WRITE_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action, detail) in filesystem_writes(doc) {
            if OPEN_WRITE_SENTINELS.contains(&detail.path.as_str()) {
                findings.push(finding_for_action(
                    self.meta(),
                    doc,
                    idx,
                    action,
                    format!("write target '{}' is fully open", detail.path),
                ));
            }
        }
        Ok(findings)
    }
}

pub struct SensitivePath;

static SENSITIVE_PATH_META: RuleMeta = RuleMeta {
    id: "fs.sensitive_path",
    group: "fs",
    severity: Severity::High,
    title: "Sensitive path access",
    description: "The document touches version-control metadata, CI workflow directories, \
                  or credential and key files.",
    recommendation: "Remove the reference, or justify it and narrow the access to read-only \
                     where possible.",
    tags: &["filesystem", "credentials"],
};

impl Rule for SensitivePath {
    fn meta(&self) -> &'static RuleMeta {
        &SENSITIVE_PATH_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(agentguard_types::ActionDetail::Filesystem(detail)) = &action.detail else {
                continue;
            };
            if !detail.sensitive {
                continue;
            }
            let verb = if detail.write { "writes" } else { "reads" };
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("{verb} sensitive path '{}'", detail.path),
            ));
        }
        Ok(findings)
    }
}

pub struct BoundaryEscape;

static BOUNDARY_ESCAPE_META: RuleMeta = RuleMeta {
    id: "fs.boundary_escape",
    group: "fs",
    severity: Severity::Medium,
    title: "Write outside the project boundary",
    description: "A write target is absolute or climbs out of the project via parent \
                  directories.",
    recommendation: "Write inside the repository; derive external paths from explicit \
                     user-supplied configuration.",
    tags: &["filesystem"],
};

fn escapes_boundary(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("~/") || path.split('/').any(|seg| seg == "..")
}

impl Rule for BoundaryEscape {
    fn meta(&self) -> &'static RuleMeta {
        &BOUNDARY_ESCAPE_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action, detail) in filesystem_writes(doc) {
            if escapes_boundary(&detail.path) {
                findings.push(finding_for_action(
                    self.meta(),
                    doc,
                    idx,
                    action,
                    format!("write target '{}' escapes the project tree", detail.path),
                ));
            }
        }
        Ok(findings)
    }
}
