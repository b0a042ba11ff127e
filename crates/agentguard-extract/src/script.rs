//! Hook shell-script extraction.
//!
//! Hook scripts are scanned line by line with the full-strength command
//! detectors; comment lines are skipped.

use agentguard_types::{Action, EvidenceKind, ExecutionContext};

use crate::catalogs::{CONF_DYNAMIC_SHELL, CONF_SHELL_COMMAND};
use crate::patterns::{scan_command_line, ScanStrength};

const SCRIPT_STRENGTH: ScanStrength = ScanStrength {
    shell_conf: CONF_SHELL_COMMAND,
    dynamic_conf: CONF_DYNAMIC_SHELL,
    shell_kind: EvidenceKind::CommandToken,
};

pub fn extract_script(content: &str, context: ExecutionContext) -> Vec<Action> {
    let mut actions = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        scan_command_line(line, (idx + 1) as u32, context, SCRIPT_STRENGTH, &mut actions);
    }
    actions
}

/// Trigger implied by a hook script's file name, e.g. `post_edit.sh` → `post_edit`.
pub fn trigger_from_file_name(path: &str) -> Option<String> {
    let name = path.replace('\\', "/");
    let name = name.rsplit('/').next()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace('-', "_").to_lowercase())
}
