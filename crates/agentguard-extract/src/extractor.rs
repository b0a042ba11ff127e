//! Top-level document extraction.
//!
//! Dispatches a (path, content) pair to the right format extractor,
//! appends the document-wide override-phrase scan, and degrades the parse
//! status on failure instead of aborting. A scan over many files never
//! stops because one document was malformed.

use agentguard_types::{
    Action, ActionType, Document, DocFormat, DocKind, Evidence, EvidenceKind, ExecutionContext,
    ParseStatus,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::catalogs::{CONF_OVERRIDE_PHRASE, OVERRIDE_PHRASES};
use crate::context::resolve_context;
use crate::dispatch::resolve;
use crate::hooks_json::extract_hook_config;
use crate::markdown::extract_markdown;
use crate::script::{extract_script, trigger_from_file_name};

/// A parsed document plus the parse errors accumulated while producing it.
#[derive(Debug)]
pub struct Extraction {
    pub document: Document,
    pub errors: Vec<String>,
}

/// Computes the document content hash: `sha256:` + 16 hex chars.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("sha256:{}", hex::encode(&digest[..8]))
}

/// Full-document scan for instruction-override / self-modification phrases.
/// Runs independently of line-by-line action extraction and emits one
/// low-structure action per match.
pub fn scan_override_phrases(content: &str, context: ExecutionContext) -> Vec<Action> {
    let mut actions = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for pattern in OVERRIDE_PHRASES.iter() {
            if let Some(m) = pattern.find(line) {
                actions.push(Action {
                    action_type: ActionType::Unknown,
                    context,
                    start_line: (idx + 1) as u32,
                    end_line: (idx + 1) as u32,
                    evidence: vec![Evidence {
                        kind: EvidenceKind::OverridePhrase,
                        value: m.as_str().to_string(),
                        confidence: CONF_OVERRIDE_PHRASE,
                    }],
                    detail: None,
                });
            }
        }
    }
    actions
}

/// Extract one document. Returns `None` when no extractor handles the path.
pub fn extract_document(path: &str, content: &str) -> Option<Extraction> {
    let profile = resolve(path)?;

    let mut errors: Vec<String> = Vec::new();
    let mut triggers: Vec<String> = Vec::new();
    let mut instruction_blocks: Vec<String> = Vec::new();
    let mut links: Vec<String> = Vec::new();

    // Hook documents start in hook context before trigger resolution; the
    // action context must match the document's primary context.
    let preliminary = if profile.kind == DocKind::Hook {
        ExecutionContext::Hook
    } else {
        ExecutionContext::Interactive
    };

    let mut actions = match profile.format {
        DocFormat::Markdown => {
            let got = extract_markdown(content, preliminary);
            triggers = got.triggers;
            instruction_blocks = got.instruction_blocks;
            links = got.links;
            got.actions
        }
        DocFormat::Shell => {
            if let Some(t) = trigger_from_file_name(path) {
                triggers.push(t);
            }
            extract_script(content, preliminary)
        }
        DocFormat::Json => {
            let got = extract_hook_config(content, preliminary);
            triggers = got.triggers;
            errors = got.errors;
            got.actions
        }
        // Dispatch never currently yields these for handled paths; scan the
        // raw lines as markdown prose so nothing silently disappears.
        DocFormat::Yaml | DocFormat::Toml | DocFormat::Plain => {
            extract_markdown(content, preliminary).actions
        }
    };

    actions.extend(scan_override_phrases(content, preliminary));

    let parse_status = if errors.is_empty() {
        ParseStatus::Ok
    } else if actions.is_empty() && triggers.is_empty() {
        ParseStatus::Failed
    } else {
        ParseStatus::Partial
    };
    let parse_confidence = match parse_status {
        ParseStatus::Ok => 1.0,
        ParseStatus::Partial => 0.5,
        ParseStatus::Failed => 0.1,
    };
    for e in &errors {
        warn!(path, error = e.as_str(), "document degraded to {}", parse_status.as_str());
    }

    let context = resolve_context(profile.kind, triggers);

    Some(Extraction {
        document: Document {
            path: path.replace('\\', "/"),
            tool_family: profile.tool_family,
            kind: profile.kind,
            format: profile.format,
            content_hash: content_hash(content),
            parse_status,
            parse_confidence,
            actions,
            capabilities: vec![],
            context,
            instruction_blocks,
            links,
        },
        errors,
    })
}
