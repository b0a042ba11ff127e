//! Tool-family dispatch by path pattern.
//!
//! An ordered list of (predicate, profile) pairs tried in sequence; the
//! first matching predicate wins. Files matching no predicate are not
//! analyzed at all.

use agentguard_types::{DocFormat, DocKind, ToolFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchProfile {
    pub tool_family: ToolFamily,
    pub kind: DocKind,
    pub format: DocFormat,
}

struct DispatchEntry {
    matches: fn(&str) -> bool,
    profile: DispatchProfile,
}

const fn profile(tool_family: ToolFamily, kind: DocKind, format: DocFormat) -> DispatchProfile {
    DispatchProfile {
        tool_family,
        kind,
        format,
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn is_shell_script(path: &str) -> bool {
    let name = file_name(path);
    name.ends_with(".sh")
        || name.ends_with(".bash")
        || name.ends_with(".zsh")
        || !name.contains('.')
}

static DISPATCH: &[DispatchEntry] = &[
    DispatchEntry {
        matches: |p| p.contains(".claude/skills/") && p.ends_with(".md"),
        profile: profile(ToolFamily::Claude, DocKind::Skill, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| p.contains(".claude/agents/") && p.ends_with(".md"),
        profile: profile(ToolFamily::Claude, DocKind::Agent, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| p.contains(".claude/hooks/") && is_shell_script(p),
        profile: profile(ToolFamily::Claude, DocKind::Hook, DocFormat::Shell),
    },
    DispatchEntry {
        matches: |p| {
            p.contains(".claude/")
                && matches!(file_name(p), "settings.json" | "settings.local.json")
        },
        profile: profile(ToolFamily::Claude, DocKind::Hook, DocFormat::Json),
    },
    DispatchEntry {
        matches: |p| matches!(file_name(p), "CLAUDE.md" | "CLAUDE.local.md"),
        profile: profile(ToolFamily::Claude, DocKind::Memory, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| {
            p.contains(".cursor/rules/") && (p.ends_with(".mdc") || p.ends_with(".md"))
        },
        profile: profile(ToolFamily::Cursor, DocKind::Rules, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| file_name(p) == ".cursorrules",
        profile: profile(ToolFamily::Cursor, DocKind::Rules, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| p.ends_with(".github/copilot-instructions.md"),
        profile: profile(ToolFamily::Copilot, DocKind::Rules, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| p.contains(".windsurf/rules/") && p.ends_with(".md"),
        profile: profile(ToolFamily::Windsurf, DocKind::Rules, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| file_name(p) == ".windsurfrules",
        profile: profile(ToolFamily::Windsurf, DocKind::Rules, DocFormat::Markdown),
    },
    DispatchEntry {
        matches: |p| file_name(p) == "AGENTS.md",
        profile: profile(ToolFamily::Generic, DocKind::Memory, DocFormat::Markdown),
    },
];

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// First matching dispatch profile for a path, if any.
pub fn resolve(path: &str) -> Option<DispatchProfile> {
    let normalized = normalize(path);
    DISPATCH
        .iter()
        .find(|e| (e.matches)(&normalized))
        .map(|e| e.profile)
}

/// Whether any extractor handles this path.
pub fn can_handle(path: &str) -> bool {
    resolve(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_skill_dispatch() {
        let p = resolve(".claude/skills/deploy/SKILL.md").expect("profile");
        assert_eq!(p.tool_family, ToolFamily::Claude);
        assert_eq!(p.kind, DocKind::Skill);
        assert_eq!(p.format, DocFormat::Markdown);
    }

    #[test]
    fn claude_hook_script_dispatch() {
        let p = resolve("repo/.claude/hooks/post_edit.sh").expect("profile");
        assert_eq!(p.kind, DocKind::Hook);
        assert_eq!(p.format, DocFormat::Shell);

        // extensionless hook scripts count too
        let p = resolve(".claude/hooks/on-commit").expect("profile");
        assert_eq!(p.format, DocFormat::Shell);
    }

    #[test]
    fn claude_settings_dispatch() {
        let p = resolve(".claude/settings.json").expect("profile");
        assert_eq!(p.kind, DocKind::Hook);
        assert_eq!(p.format, DocFormat::Json);
    }

    #[test]
    fn skill_beats_memory_for_nested_claude_md() {
        // Ordering check: a SKILL.md under .claude/skills/ resolves as a
        // skill even though later predicates would also inspect the name.
        let p = resolve(".claude/skills/notes/CLAUDE.md").expect("profile");
        assert_eq!(p.kind, DocKind::Skill);
    }

    #[test]
    fn cursor_and_copilot_and_windsurf() {
        assert_eq!(
            resolve(".cursor/rules/style.mdc").map(|p| p.tool_family),
            Some(ToolFamily::Cursor)
        );
        assert_eq!(
            resolve("project/.cursorrules").map(|p| p.kind),
            Some(DocKind::Rules)
        );
        assert_eq!(
            resolve(".github/copilot-instructions.md").map(|p| p.tool_family),
            Some(ToolFamily::Copilot)
        );
        assert_eq!(
            resolve(".windsurf/rules/main.md").map(|p| p.tool_family),
            Some(ToolFamily::Windsurf)
        );
    }

    #[test]
    fn agents_md_is_generic_memory() {
        let p = resolve("AGENTS.md").expect("profile");
        assert_eq!(p.tool_family, ToolFamily::Generic);
        assert_eq!(p.kind, DocKind::Memory);
    }

    #[test]
    fn unmatched_paths_are_not_handled() {
        assert!(!can_handle("src/main.rs"));
        assert!(!can_handle("README.md"));
        assert!(!can_handle(".claude/skills/deploy/helper.py"));
    }

    #[test]
    fn windows_separators_normalize() {
        assert!(can_handle(r".claude\skills\deploy\SKILL.md"));
    }
}
