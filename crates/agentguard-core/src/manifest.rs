//! Least-privilege permission manifest derivation.

use agentguard_types::{CapabilitySummary, PermissionManifest, OPEN_WRITE_SENTINELS};

/// Derives the recommended manifest from a finished summary: write paths
/// minus the fully-open sentinels, shell only without dynamic patterns,
/// network only without executable fetches, secrets always empty.
pub fn derive_manifest(summary: &CapabilitySummary) -> PermissionManifest {
    let network = summary.net_outbound && !summary.net_fetches_executable;
    PermissionManifest {
        write_paths: summary
            .fs_write_paths
            .iter()
            .filter(|p| !OPEN_WRITE_SENTINELS.contains(&p.as_str()))
            .cloned()
            .collect(),
        shell: summary.shell_enabled && !summary.shell_dynamic,
        network,
        network_domains: if network {
            summary.net_domains.clone()
        } else {
            Default::default()
        },
        secrets: Default::default(),
    }
}
