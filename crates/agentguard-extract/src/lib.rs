//! Heuristic evidence extraction: raw configuration text in, typed actions out.
//!
//! This crate is I/O-free and never executes, fetches, or modifies the
//! content it scans. Dispatch is an ordered predicate list over path
//! patterns; detection confidences are fixed per method.

pub mod catalogs;
mod context;
mod dispatch;
mod extractor;
mod hooks_json;
mod markdown;
mod patterns;
mod script;

pub use context::{resolve_context, CI_TRIGGERS};
pub use dispatch::{can_handle, resolve, DispatchProfile};
pub use extractor::{content_hash, extract_document, scan_override_phrases, Extraction};
pub use markdown::{extract_markdown, MarkdownExtraction};
pub use patterns::{
    classify_shell, detect_env_refs, detect_urls, git_operation, is_executable_url,
    is_secret_file, is_secret_name, redirect_target, scan_command_line, sensitive_fragments_in,
    url_domain, ScanStrength, ShellHit,
};
pub use script::{extract_script, trigger_from_file_name};
