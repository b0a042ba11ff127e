//! Hook configuration extraction from settings JSON.
//!
//! Walks the `hooks` object of a settings file: every `command` string is
//! scanned with the full-strength command detectors. Malformed entries are
//! skipped and recorded; a top-level parse failure yields no actions.

use agentguard_types::{Action, EvidenceKind, ExecutionContext};
use serde_json::Value;

use crate::catalogs::{CONF_DYNAMIC_SHELL, CONF_SHELL_COMMAND};
use crate::patterns::{scan_command_line, ScanStrength};

const HOOK_STRENGTH: ScanStrength = ScanStrength {
    shell_conf: CONF_SHELL_COMMAND,
    dynamic_conf: CONF_DYNAMIC_SHELL,
    shell_kind: EvidenceKind::CommandToken,
};

#[derive(Debug, Default)]
pub struct HookConfigExtraction {
    pub actions: Vec<Action>,
    pub triggers: Vec<String>,
    pub errors: Vec<String>,
}

pub fn extract_hook_config(content: &str, context: ExecutionContext) -> HookConfigExtraction {
    let mut out = HookConfigExtraction::default();

    let root: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            out.errors.push(format!("invalid hook settings JSON: {e}"));
            return out;
        }
    };

    let Some(hooks) = root.get("hooks").and_then(Value::as_object) else {
        return out;
    };

    for (event, matchers) in hooks {
        let trigger = snake_case(event);
        if !out.triggers.contains(&trigger) {
            out.triggers.push(trigger);
        }

        let Some(matchers) = matchers.as_array() else {
            out.errors
                .push(format!("hook event '{event}' is not an array"));
            continue;
        };
        for matcher in matchers {
            let entries = matcher
                .get("hooks")
                .and_then(Value::as_array)
                .map(|a| a.as_slice())
                .unwrap_or(std::slice::from_ref(matcher));
            for entry in entries {
                let Some(command) = entry.get("command").and_then(Value::as_str) else {
                    continue;
                };
                let line_no = anchor_line(content, command);
                scan_command_line(command, line_no, context, HOOK_STRENGTH, &mut out.actions);
            }
        }
    }

    out
}

/// Best-effort line anchor: the first raw line containing the command text.
fn anchor_line(content: &str, command: &str) -> u32 {
    let probe: String = command.chars().take(24).collect();
    content
        .lines()
        .position(|l| l.contains(probe.as_str()))
        .map(|i| (i + 1) as u32)
        .unwrap_or(1)
}

fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
