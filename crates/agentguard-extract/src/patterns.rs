//! Shared line-level detectors.
//!
//! Plain functions usable by any extractor: shell classification, URL and
//! environment-variable extraction, sensitive-path matching, and the
//! combined command-line scan that turns one line of executable text into
//! typed actions.

use agentguard_types::{
    Action, ActionDetail, ActionType, DynamicShellKind, Evidence, EvidenceKind, ExecutionContext,
    FilesystemDetail, GitDetail, NetworkDetail, NetworkDirection, PropagationTarget, SecretsDetail,
    ShellDetail,
};

use crate::catalogs::{
    CONF_ENV_REFERENCE, CONF_SENSITIVE_PATH, CONF_URL_REFERENCE, COMMAND_TOKENS,
    EXECUTABLE_URL_SUFFIXES, RE_ENV_REF, RE_EVAL, RE_REDIRECT, RE_REMOTE_PIPE,
    RE_SUBSTITUTED_FETCH, RE_URL, SECRET_ENV_NAMES, SECRET_FILE_NAMES, SENSITIVE_PATH_FRAGMENTS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellHit {
    pub command: String,
    pub dynamic: bool,
    pub dynamic_kind: Option<DynamicShellKind>,
}

/// Classify one line of command text. Dynamic patterns win over plain
/// command tokens; a line matching neither returns `None`.
pub fn classify_shell(line: &str) -> Option<ShellHit> {
    if RE_REMOTE_PIPE.is_match(line) {
        return Some(ShellHit {
            command: line.trim().to_string(),
            dynamic: true,
            dynamic_kind: Some(DynamicShellKind::RemotePipe),
        });
    }
    if RE_EVAL.is_match(line) {
        return Some(ShellHit {
            command: line.trim().to_string(),
            dynamic: true,
            dynamic_kind: Some(DynamicShellKind::Eval),
        });
    }
    if RE_SUBSTITUTED_FETCH.is_match(line) {
        return Some(ShellHit {
            command: line.trim().to_string(),
            dynamic: true,
            dynamic_kind: Some(DynamicShellKind::Interpolation),
        });
    }

    // Plain command: the leading word of a pipeline segment must be a
    // known token. Checking segment heads (not arbitrary substrings) keeps
    // ordinary prose from matching in fenced usage examples.
    for segment in line.split(['|', ';', '&']) {
        let mut words = segment.split_whitespace();
        let Some(mut head) = words.next() else {
            continue;
        };
        // skip sudo and leading env assignments
        while head == "sudo" || head.contains('=') {
            match words.next() {
                Some(next) => head = next,
                None => break,
            }
        }
        let head = head.rsplit('/').next().unwrap_or(head);
        if COMMAND_TOKENS.contains(&head) {
            return Some(ShellHit {
                command: segment.trim().to_string(),
                dynamic: false,
                dynamic_kind: None,
            });
        }
    }
    None
}

pub fn detect_urls(line: &str) -> Vec<String> {
    RE_URL.find_iter(line).map(|m| m.as_str().to_string()).collect()
}

pub fn url_domain(url: &str) -> Option<String> {
    let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.split('@').next_back()?;
    let host = host.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Whether a fetched URL points at directly runnable content.
pub fn is_executable_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    EXECUTABLE_URL_SUFFIXES.iter().any(|s| path.ends_with(s)) || path.contains("/install")
}

/// Environment-variable names referenced on a line, as written.
pub fn detect_env_refs(line: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in RE_ENV_REF.captures_iter(line) {
        let name = caps.get(1).or_else(|| caps.get(2));
        if let Some(m) = name {
            if !names.iter().any(|n| n == m.as_str()) {
                names.push(m.as_str().to_string());
            }
        }
    }
    names
}

/// A variable is secret if its upper-cased name equals or contains a
/// catalog entry.
pub fn is_secret_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    SECRET_ENV_NAMES.iter().any(|s| upper == *s || upper.contains(s))
}

/// Sensitive catalog fragments present in a line (case-insensitive substring).
pub fn sensitive_fragments_in(line: &str) -> Vec<&'static str> {
    let lower = line.to_lowercase();
    SENSITIVE_PATH_FRAGMENTS
        .iter()
        .copied()
        .filter(|f| lower.contains(f))
        .collect()
}

/// Whether a path names a known secret-material file.
pub fn is_secret_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);
    SECRET_FILE_NAMES.iter().any(|f| lower.ends_with(f) || name == *f)
}

pub fn redirect_target(line: &str) -> Option<String> {
    RE_REDIRECT
        .captures(line)
        .map(|c| c[1].to_string())
        .filter(|t| t != "/dev/null" && t != "&1" && t != "&2")
}

/// `git <operation>` at a pipeline-segment head.
pub fn git_operation(line: &str) -> Option<String> {
    for segment in line.split(['|', ';', '&']) {
        let mut words = segment.split_whitespace();
        let Some(mut head) = words.next() else {
            continue;
        };
        while head == "sudo" {
            match words.next() {
                Some(next) => head = next,
                None => break,
            }
        }
        if head != "git" {
            continue;
        }
        if let Some(op) = words.find(|w| !w.starts_with('-')) {
            return Some(op.to_string());
        }
    }
    None
}

/// Confidences and evidence kind for one scanning pass. Script scanning and
/// fenced-block scanning use the same detectors at different strengths.
#[derive(Debug, Clone, Copy)]
pub struct ScanStrength {
    pub shell_conf: f64,
    pub dynamic_conf: f64,
    pub shell_kind: EvidenceKind,
}

fn evidence(kind: EvidenceKind, value: &str, confidence: f64) -> Evidence {
    Evidence {
        kind,
        value: value.to_string(),
        confidence,
    }
}

/// Scan one line of executable text and append every action it implies.
///
/// This is the combined detector used for hook scripts and shell-family
/// fenced blocks. A single line can legitimately yield several actions
/// (Scenario: `curl https://x.com/install.sh | bash` yields one dynamic
/// shell_exec and one network_call with fetches_executable).
pub fn scan_command_line(
    line: &str,
    line_no: u32,
    context: ExecutionContext,
    strength: ScanStrength,
    out: &mut Vec<Action>,
) {
    let shell_hit = classify_shell(line);
    let urls = detect_urls(line);
    let redirect = redirect_target(line);

    if let Some(hit) = &shell_hit {
        let (kind, conf) = if hit.dynamic {
            (EvidenceKind::DynamicPattern, strength.dynamic_conf)
        } else {
            (strength.shell_kind, strength.shell_conf)
        };
        out.push(Action {
            action_type: ActionType::ShellExec,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(kind, line.trim(), conf)],
            detail: Some(ActionDetail::Shell(ShellDetail {
                command: hit.command.clone(),
                dynamic: hit.dynamic,
                dynamic_kind: hit.dynamic_kind,
            })),
        });
    }

    if let Some(op) = git_operation(line) {
        out.push(Action {
            action_type: ActionType::GitOperation,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(strength.shell_kind, line.trim(), strength.shell_conf)],
            detail: Some(ActionDetail::Git(GitDetail { operation: op })),
        });
    }

    let piped_to_shell = shell_hit.as_ref().is_some_and(|h| {
        h.dynamic && h.dynamic_kind == Some(DynamicShellKind::RemotePipe)
    });
    for url in &urls {
        let fetches_executable = piped_to_shell || is_executable_url(url);
        out.push(Action {
            action_type: ActionType::NetworkCall,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(EvidenceKind::UrlReference, url, CONF_URL_REFERENCE)],
            detail: Some(ActionDetail::Network(NetworkDetail {
                url: Some(url.clone()),
                domain: url_domain(url),
                direction: NetworkDirection::Outbound,
                fetches_executable,
            })),
        });
    }

    if let Some(target) = &redirect {
        let sensitive = !sensitive_fragments_in(target).is_empty();
        out.push(Action {
            action_type: ActionType::FileWrite,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(strength.shell_kind, line.trim(), strength.shell_conf)],
            detail: Some(ActionDetail::Filesystem(FilesystemDetail {
                path: target.clone(),
                write: true,
                sensitive,
            })),
        });
    }

    for fragment in sensitive_fragments_in(line) {
        // Redirect targets already produced a write action above.
        if redirect.as_deref().is_some_and(|t| t.to_lowercase().contains(fragment)) {
            continue;
        }
        out.push(Action {
            action_type: ActionType::FileRead,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(EvidenceKind::PathFragment, fragment, CONF_SENSITIVE_PATH)],
            detail: Some(ActionDetail::Filesystem(FilesystemDetail {
                path: fragment.to_string(),
                write: false,
                sensitive: true,
            })),
        });
    }

    for name in detect_env_refs(line) {
        if !is_secret_name(&name) {
            continue;
        }
        let mut propagation = Vec::new();
        if shell_hit.is_some() {
            propagation.push(PropagationTarget::Shell);
        }
        if !urls.is_empty() {
            propagation.push(PropagationTarget::Network);
        }
        if redirect.is_some() {
            propagation.push(PropagationTarget::File);
        }
        out.push(Action {
            action_type: ActionType::Unknown,
            context,
            start_line: line_no,
            end_line: line_no,
            evidence: vec![evidence(EvidenceKind::EnvReference, &name, CONF_ENV_REFERENCE)],
            detail: Some(ActionDetail::Secrets(SecretsDetail {
                variable: name.to_uppercase(),
                propagation,
            })),
        });
    }
}
