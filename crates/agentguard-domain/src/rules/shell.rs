//! Shell-execution rules.

use agentguard_types::{
    ActionDetail, ActionType, Document, DynamicShellKind, ExecutionContext, Finding, Severity,
};

use super::{finding_for_action, Rule, RuleContext, RuleError, RuleMeta};

/// Triggers that exempt a hook from the auto-trigger rules.
const EXEMPT_TRIGGERS: &[&str] = &["manual", "unknown"];

pub struct DynamicExec;

static DYNAMIC_EXEC_META: RuleMeta = RuleMeta {
    id: "shell.dynamic_exec",
    group: "shell",
    severity: Severity::High,
    title: "Dynamic shell execution",
    description: "Shell content is constructed or fetched at run time, so the executed \
                  commands cannot be reviewed ahead of time.",
    recommendation: "Pin commands statically; never pipe remote content into an interpreter \
                     or eval interpolated strings.",
    tags: &["shell", "injection"],
};

impl Rule for DynamicExec {
    fn meta(&self) -> &'static RuleMeta {
        &DYNAMIC_EXEC_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            let Some(ActionDetail::Shell(detail)) = &action.detail else {
                continue;
            };
            if !detail.dynamic {
                continue;
            }
            let message = match detail.dynamic_kind {
                Some(DynamicShellKind::RemotePipe) => {
                    "remote content is piped directly into a shell interpreter".to_string()
                }
                Some(DynamicShellKind::Eval) => {
                    "eval is applied to a variable or quoted string".to_string()
                }
                Some(DynamicShellKind::Interpolation) | None => {
                    "a command substitution wraps a remote fetch".to_string()
                }
            };
            findings.push(finding_for_action(self.meta(), doc, idx, action, message));
        }
        Ok(findings)
    }
}

pub struct HookSideEffect;

static HOOK_SIDE_EFFECT_META: RuleMeta = RuleMeta {
    id: "shell.hook_side_effect",
    group: "shell",
    severity: Severity::Medium,
    title: "Side effect inside a hook",
    description: "Hooks run without the user in the loop; shell, write and network actions \
                  inside them execute on every trigger.",
    recommendation: "Keep hooks minimal and auditable; move heavyweight work behind an \
                     explicit user-invoked command.",
    tags: &["shell", "hooks"],
};

fn is_side_effect(action_type: ActionType) -> bool {
    matches!(
        action_type,
        ActionType::ShellExec | ActionType::FileWrite | ActionType::NetworkCall
    )
}

impl Rule for HookSideEffect {
    fn meta(&self) -> &'static RuleMeta {
        &HOOK_SIDE_EFFECT_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if doc.context.primary != ExecutionContext::Hook {
            return Ok(vec![]);
        }
        let mut findings = Vec::new();
        for (idx, action) in doc.actions.iter().enumerate() {
            if !is_side_effect(action.action_type) {
                continue;
            }
            findings.push(finding_for_action(
                self.meta(),
                doc,
                idx,
                action,
                format!("hook performs a {} action", action.action_type.as_str()),
            ));
        }
        Ok(findings)
    }
}

pub struct AutoTriggeredHook;

static AUTO_TRIGGERED_META: RuleMeta = RuleMeta {
    id: "hooks.auto_triggered",
    group: "hooks",
    severity: Severity::Medium,
    title: "Automatically triggered hook with side effects",
    description: "The hook declares a non-manual trigger, so its side effects run without \
                  any explicit user action.",
    recommendation: "Use a manual trigger, or document and scope exactly what the hook is \
                     allowed to touch.",
    tags: &["hooks"],
};

impl Rule for AutoTriggeredHook {
    fn meta(&self) -> &'static RuleMeta {
        &AUTO_TRIGGERED_META
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>, RuleError> {
        if doc.context.primary != ExecutionContext::Hook {
            return Ok(vec![]);
        }
        // Side effects without any declared trigger are exempt; so are
        // explicitly manual/unknown triggers.
        let auto_triggers: Vec<&str> = doc
            .context
            .triggers
            .iter()
            .map(String::as_str)
            .filter(|t| !EXEMPT_TRIGGERS.contains(t))
            .collect();
        if auto_triggers.is_empty() {
            return Ok(vec![]);
        }

        let side_effects: Vec<usize> = doc
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| is_side_effect(a.action_type))
            .map(|(i, _)| i)
            .collect();
        let Some(&first) = side_effects.first() else {
            return Ok(vec![]);
        };

        let action = &doc.actions[first];
        let confidence = action.confidence();
        Ok(vec![super::build_finding(
            self.meta(),
            doc,
            action.start_line,
            action.end_line,
            super::primary_evidence(action),
            confidence,
            format!(
                "hook runs side effects on trigger '{}' without user involvement",
                auto_triggers.join("', '")
            ),
            side_effects,
        )])
    }
}
