//! Property-based tests for agentguard-diff.

use proptest::prelude::*;
use std::collections::BTreeSet;

use agentguard_diff::diff_summaries;
use agentguard_types::CapabilitySummary;

fn summary_strategy() -> impl Strategy<Value = CapabilitySummary> {
    (
        any::<(bool, bool, bool, bool, bool, bool, bool, bool)>(),
        prop::collection::btree_set("[a-z./]{1,10}", 0..5),
        prop::collection::btree_set("[A-Z_]{3,12}", 0..5),
        prop::collection::btree_set("[a-z]{1,8}\\.(com|io)", 0..4),
    )
        .prop_map(|(flags, sensitive, secrets, domains)| {
            let (
                shell_enabled,
                shell_dynamic,
                net_outbound,
                net_inbound,
                net_fetches_executable,
                secret_propagation,
                has_hooks,
                has_ci_context,
            ) = flags;
            CapabilitySummary {
                shell_enabled,
                shell_dynamic,
                net_outbound,
                net_inbound,
                net_fetches_executable,
                secret_propagation,
                has_hooks,
                has_ci_context,
                fs_sensitive_paths: sensitive,
                secret_env_vars: secrets,
                net_domains: domains,
                ..CapabilitySummary::default()
            }
        })
}

/// Union of two summaries: every flag ORed, every set unioned.
fn union(a: &CapabilitySummary, b: &CapabilitySummary) -> CapabilitySummary {
    let merge = |x: &BTreeSet<String>, y: &BTreeSet<String>| x.union(y).cloned().collect();
    CapabilitySummary {
        shell_enabled: a.shell_enabled || b.shell_enabled,
        shell_dynamic: a.shell_dynamic || b.shell_dynamic,
        net_outbound: a.net_outbound || b.net_outbound,
        net_inbound: a.net_inbound || b.net_inbound,
        net_fetches_executable: a.net_fetches_executable || b.net_fetches_executable,
        secret_propagation: a.secret_propagation || b.secret_propagation,
        has_hooks: a.has_hooks || b.has_hooks,
        has_ci_context: a.has_ci_context || b.has_ci_context,
        fs_sensitive_paths: merge(&a.fs_sensitive_paths, &b.fs_sensitive_paths),
        secret_env_vars: merge(&a.secret_env_vars, &b.secret_env_vars),
        net_domains: merge(&a.net_domains, &b.net_domains),
        ..CapabilitySummary::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    // Comparing a summary against itself yields no changes.
    #[test]
    fn self_diff_is_empty(summary in summary_strategy()) {
        prop_assert!(diff_summaries(&summary, &summary).is_empty());
    }

    // Shrinking never emits: target ⊆ base means no changes at all.
    #[test]
    fn contraction_emits_nothing(base in summary_strategy(), extra in summary_strategy()) {
        let grown = union(&base, &extra);
        prop_assert!(diff_summaries(&grown, &base).is_empty());
    }

    // Growth emits only expansion changes, and a second diff after the
    // growth has landed is clean (transitions are edge-triggered).
    #[test]
    fn growth_is_edge_triggered(base in summary_strategy(), extra in summary_strategy()) {
        let grown = union(&base, &extra);
        let first = diff_summaries(&base, &grown);
        let settled = diff_summaries(&grown, &grown);
        prop_assert!(settled.is_empty());
        // every reported change corresponds to an actual base→grown delta
        if base == grown {
            prop_assert!(first.is_empty());
        }
    }
}
