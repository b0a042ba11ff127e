//! Markdown document extraction.
//!
//! Handles skill, agent, rules and memory documents: YAML-ish frontmatter
//! triggers, shell-family fenced blocks (rescanned with the command-line
//! detectors at reduced confidence), inline narrative patterns, prose-level
//! secret and sensitive-path references, instruction blocks and links.

use agentguard_types::{
    Action, ActionDetail, ActionType, Evidence, EvidenceKind, ExecutionContext, FilesystemDetail,
    NetworkDetail, NetworkDirection, SecretsDetail, ShellDetail,
};

use crate::catalogs::{
    CONF_DYNAMIC_SHELL, CONF_ENV_REFERENCE, CONF_FENCED_COMMAND, CONF_NARRATIVE_FETCH,
    CONF_NARRATIVE_RUN, CONF_NARRATIVE_WRITE, CONF_SENSITIVE_PATH, RE_MD_LINK, RE_NARRATIVE_FETCH,
    RE_NARRATIVE_RUN, RE_NARRATIVE_WRITE, SHELL_FENCE_LABELS,
};
use crate::patterns::{
    classify_shell, detect_env_refs, is_executable_url, is_secret_name, scan_command_line,
    sensitive_fragments_in, url_domain, ScanStrength,
};

/// Everything a markdown pass produces; the caller assembles the Document.
#[derive(Debug, Default)]
pub struct MarkdownExtraction {
    pub actions: Vec<Action>,
    pub instruction_blocks: Vec<String>,
    pub links: Vec<String>,
    pub triggers: Vec<String>,
}

const FENCED_STRENGTH: ScanStrength = ScanStrength {
    shell_conf: CONF_FENCED_COMMAND,
    dynamic_conf: CONF_DYNAMIC_SHELL,
    shell_kind: EvidenceKind::FencedBlock,
};

/// Frontmatter keys whose values are taken as trigger metadata.
const TRIGGER_KEYS: &[&str] = &["trigger", "triggers", "on", "event", "events"];

pub fn extract_markdown(content: &str, context: ExecutionContext) -> MarkdownExtraction {
    let mut out = MarkdownExtraction::default();

    let mut in_frontmatter = false;
    let mut frontmatter_done = false;
    let mut in_fence = false;
    let mut fence_is_shell = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = line.trim();

        // Frontmatter handling: only a leading `---` opens it.
        if !frontmatter_done && idx == 0 && trimmed == "---" {
            in_frontmatter = true;
            continue;
        }
        if in_frontmatter {
            if trimmed == "---" {
                in_frontmatter = false;
                frontmatter_done = true;
            } else {
                collect_trigger(trimmed, &mut out.triggers);
            }
            continue;
        }

        // Fence transitions.
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if in_fence {
                in_fence = false;
                fence_is_shell = false;
            } else {
                in_fence = true;
                let label = trimmed.trim_start_matches(['`', '~']).trim().to_lowercase();
                fence_is_shell = SHELL_FENCE_LABELS.iter().any(|l| label == *l);
            }
            flush_paragraph(&mut paragraph, &mut out.instruction_blocks);
            continue;
        }

        if in_fence {
            if fence_is_shell {
                scan_command_line(line, line_no, context, FENCED_STRENGTH, &mut out.actions);
            }
            continue;
        }

        // Prose line.
        for caps in RE_MD_LINK.captures_iter(line) {
            out.links.push(caps[1].to_string());
        }
        scan_prose_line(line, line_no, context, &mut out.actions);

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut out.instruction_blocks);
        } else if !trimmed.starts_with('#') {
            paragraph.push(trimmed);
        }
    }
    flush_paragraph(&mut paragraph, &mut out.instruction_blocks);

    out
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if !paragraph.is_empty() {
        blocks.push(paragraph.join(" "));
        paragraph.clear();
    }
}

fn collect_trigger(line: &str, triggers: &mut Vec<String>) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    if !TRIGGER_KEYS.contains(&key.trim().to_lowercase().as_str()) {
        return;
    }
    for part in value.split([',', '[', ']']) {
        let t = part.trim().trim_matches(['"', '\'']).to_lowercase();
        if !t.is_empty() && !triggers.contains(&t) {
            triggers.push(t);
        }
    }
}

/// Narrative patterns plus prose-level secret / sensitive-path references.
fn scan_prose_line(line: &str, line_no: u32, context: ExecutionContext, out: &mut Vec<Action>) {
    for caps in RE_NARRATIVE_RUN.captures_iter(line) {
        let command = caps[1].to_string();
        let hit = classify_shell(&command);
        let (dynamic, dynamic_kind) = hit
            .map(|h| (h.dynamic, h.dynamic_kind))
            .unwrap_or((false, None));
        out.push(Action {
            action_type: ActionType::ShellExec,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![Evidence {
                kind: EvidenceKind::Narrative,
                value: caps[0].to_string(),
                confidence: CONF_NARRATIVE_RUN,
            }],
            detail: Some(ActionDetail::Shell(ShellDetail {
                command,
                dynamic,
                dynamic_kind,
            })),
        });
    }

    for caps in RE_NARRATIVE_WRITE.captures_iter(line) {
        let path = caps[1].to_string();
        let sensitive = !sensitive_fragments_in(&path).is_empty();
        out.push(Action {
            action_type: ActionType::FileWrite,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![Evidence {
                kind: EvidenceKind::Narrative,
                value: caps[0].to_string(),
                confidence: CONF_NARRATIVE_WRITE,
            }],
            detail: Some(ActionDetail::Filesystem(FilesystemDetail {
                path,
                write: true,
                sensitive,
            })),
        });
    }

    for caps in RE_NARRATIVE_FETCH.captures_iter(line) {
        let target = caps[1].trim_end_matches(['.', ',']).to_string();
        out.push(Action {
            action_type: ActionType::NetworkCall,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![Evidence {
                kind: EvidenceKind::Narrative,
                value: caps[0].trim().to_string(),
                confidence: CONF_NARRATIVE_FETCH,
            }],
            detail: Some(ActionDetail::Network(NetworkDetail {
                domain: url_domain(&target),
                fetches_executable: is_executable_url(&target),
                url: Some(target),
                direction: NetworkDirection::Outbound,
            })),
        });
    }

    for name in detect_env_refs(line) {
        if !is_secret_name(&name) {
            continue;
        }
        out.push(Action {
            action_type: ActionType::Unknown,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![Evidence {
                kind: EvidenceKind::EnvReference,
                value: name.clone(),
                confidence: CONF_ENV_REFERENCE,
            }],
            detail: Some(ActionDetail::Secrets(SecretsDetail {
                variable: name.to_uppercase(),
                propagation: vec![],
            })),
        });
    }

    for fragment in sensitive_fragments_in(line) {
        out.push(Action {
            action_type: ActionType::FileRead,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![Evidence {
                kind: EvidenceKind::PathFragment,
                value: fragment.to_string(),
                confidence: CONF_SENSITIVE_PATH,
            }],
            detail: Some(ActionDetail::Filesystem(FilesystemDetail {
                path: fragment.to_string(),
                write: false,
                sensitive: true,
            })),
        });
    }
}
