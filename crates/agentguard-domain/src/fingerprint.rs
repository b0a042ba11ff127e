//! Deterministic finding identities.
//!
//! Three digests per finding, each a SHA-256 truncated to 16 hex chars and
//! tagged with the algorithm. Identical logical inputs must yield identical
//! fingerprints on any machine, any run; report renderers and the diff and
//! baseline layers all key off the stable digest.

use agentguard_types::FingerprintSet;
use sha2::{Digest, Sha256};

/// Trim, collapse internal whitespace runs to one space, lowercase.
pub fn normalize_evidence(evidence: &str) -> String {
    let mut out = String::with_capacity(evidence.len());
    let mut pending_space = false;
    for ch in evidence.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("sha256:{}", hex::encode(&digest[..8]))
}

/// Computes the full fingerprint set for one finding.
pub fn fingerprints(
    rule_id: &str,
    path: &str,
    start_line: u32,
    end_line: u32,
    evidence: &str,
) -> FingerprintSet {
    let normalized = normalize_evidence(evidence);
    FingerprintSet {
        stable: short_hash(&format!("{rule_id}:{path}:{start_line}:{normalized}")),
        location: short_hash(&format!("{rule_id}:{path}:{start_line}:{end_line}")),
        content: short_hash(&format!("{rule_id}:{normalized}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_evidence("  Curl   -s\thttps://X.com  "), "curl -s https://x.com");
        assert_eq!(normalize_evidence("a\n\nb"), "a b");
        assert_eq!(normalize_evidence(""), "");
    }

    #[test]
    fn fingerprints_are_tagged_short_hex() {
        let fp = fingerprints("shell.dynamic_exec", "a/SKILL.md", 3, 3, "curl | bash");
        for digest in [&fp.stable, &fp.location, &fp.content] {
            let hex = digest.strip_prefix("sha256:").expect("tag");
            assert_eq!(hex.len(), 16);
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn stable_is_whitespace_and_case_invariant() {
        let a = fingerprints("r", "p.md", 1, 1, "curl  -s   https://X.com | BASH");
        let b = fingerprints("r", "p.md", 1, 1, "curl -s https://x.com | bash");
        assert_eq!(a.stable, b.stable);
        assert_eq!(a.content, b.content);
    }

    #[test]
    fn location_ignores_evidence_drift() {
        let a = fingerprints("r", "p.md", 4, 6, "one thing");
        let b = fingerprints("r", "p.md", 4, 6, "another thing");
        assert_eq!(a.location, b.location);
        assert_ne!(a.stable, b.stable);
    }

    #[test]
    fn content_ignores_location_drift() {
        let a = fingerprints("r", "p.md", 4, 4, "same evidence");
        let b = fingerprints("r", "other.md", 9, 9, "same evidence");
        assert_eq!(a.content, b.content);
        assert_ne!(a.stable, b.stable);
    }

    #[test]
    fn digests_differ_across_components() {
        let fp = fingerprints("r", "p.md", 1, 2, "ev");
        assert_ne!(fp.stable, fp.location);
        assert_ne!(fp.stable, fp.content);
    }

    #[test]
    fn snapshot_stable_fingerprint() {
        let fp = fingerprints(
            "shell.dynamic_exec",
            ".claude/skills/deploy/SKILL.md",
            12,
            12,
            "curl https://x.com/install.sh | bash",
        );
        // Anchors the algorithm; a change here breaks every stored baseline.
        insta::assert_snapshot!(fp.stable, @"sha256:f1fd11411aa921ac");
    }
}
