//! File discovery.
//!
//! Walks a root directory, keeps files an extractor claims, applies the
//! include/exclude globs, and returns (path, content) pairs in sorted order
//! so scans are deterministic regardless of filesystem iteration order.

use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use agentguard_core::ScanInput;
use agentguard_extract::can_handle;

fn compile_globs(globs: &[String]) -> Result<Option<GlobSet>> {
    if globs.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for g in globs {
        let glob = Glob::new(g).with_context(|| format!("invalid glob '{g}'"))?;
        builder.add(glob);
    }
    Ok(Some(builder.build().expect("globset build should succeed")))
}

pub fn discover(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<ScanInput>> {
    let include = compile_globs(include)?;
    let exclude = compile_globs(exclude)?;

    let mut inputs = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        if !can_handle(&relative) {
            continue;
        }
        if let Some(include) = &include {
            if !include.is_match(&relative) {
                continue;
            }
        }
        if let Some(exclude) = &exclude {
            if exclude.is_match(&relative) {
                debug!(path = relative.as_str(), "excluded by glob");
                continue;
            }
        }

        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        inputs.push(ScanInput {
            path: relative,
            content,
        });
    }

    inputs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_handled_files_in_sorted_order() {
        let td = tempfile::tempdir().expect("tempdir");
        let root = td.path();
        std::fs::create_dir_all(root.join(".claude/skills/b")).unwrap();
        std::fs::create_dir_all(root.join(".claude/skills/a")).unwrap();
        std::fs::write(root.join(".claude/skills/b/SKILL.md"), "# B\n").unwrap();
        std::fs::write(root.join(".claude/skills/a/SKILL.md"), "# A\n").unwrap();
        std::fs::write(root.join("README.md"), "# readme\n").unwrap();

        let inputs = discover(root, &[], &[]).expect("discover");
        let paths: Vec<&str> = inputs.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![".claude/skills/a/SKILL.md", ".claude/skills/b/SKILL.md"]
        );
    }

    #[test]
    fn exclude_globs_filter_paths() {
        let td = tempfile::tempdir().expect("tempdir");
        let root = td.path();
        std::fs::create_dir_all(root.join(".claude/skills/x")).unwrap();
        std::fs::write(root.join(".claude/skills/x/SKILL.md"), "# X\n").unwrap();

        let inputs =
            discover(root, &[], &["**/skills/**".to_string()]).expect("discover");
        assert!(inputs.is_empty());
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let td = tempfile::tempdir().expect("tempdir");
        assert!(discover(td.path(), &["[".to_string()], &[]).is_err());
    }
}
