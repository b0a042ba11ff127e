//! Policy file loading.
//!
//! The policy file is TOML with the same shape as [`AuditConfig`]; the core
//! validates values, this module only parses. A missing explicit path is an
//! error; the default path is optional.

use std::path::Path;

use anyhow::{Context, Result};

use agentguard_types::AuditConfig;

pub const DEFAULT_CONFIG_PATH: &str = "agentguard.toml";

pub fn load_config(path: Option<&Path>, root: &Path) -> Result<AuditConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
        }
        None => {
            let default = root.join(DEFAULT_CONFIG_PATH);
            if default.is_file() {
                let text = std::fs::read_to_string(&default)
                    .with_context(|| format!("reading config {}", default.display()))?;
                parse_config(&text)
                    .with_context(|| format!("parsing config {}", default.display()))
            } else {
                Ok(AuditConfig::default())
            }
        }
    }
}

pub fn parse_config(text: &str) -> Result<AuditConfig> {
    let config: AuditConfig = toml::from_str(text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentguard_types::Severity;

    #[test]
    fn parses_grouped_options() {
        let config = parse_config(
            r#"
[policy]
min_confidence = 0.8
fail_threshold = "medium"
strict = true

[scan]
max_files = 100
exclude = ["vendor/**"]

[rules]
disabled = ["net.empty_allowlist"]

[rules.severity_overrides]
"scope.broad_write" = "high"

[capabilities]
network_outbound = true
network_allowlist = ["api.example.com"]

[baseline]
path = ".agentguard-baseline.json"
"#,
        )
        .expect("parse");

        assert_eq!(config.policy.min_confidence, 0.8);
        assert_eq!(config.policy.fail_threshold, Severity::Medium);
        assert!(config.policy.strict);
        assert_eq!(config.scan.max_files, 100);
        assert_eq!(config.rules.disabled, vec!["net.empty_allowlist"]);
        assert_eq!(
            config.rules.severity_overrides.get("scope.broad_write"),
            Some(&Severity::High)
        );
        assert_eq!(config.capabilities.network_allowlist, vec!["api.example.com"]);
        assert_eq!(config.baseline.path.as_deref(), Some(".agentguard-baseline.json"));
    }

    #[test]
    fn empty_config_is_defaults() {
        let config = parse_config("").expect("parse");
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn unknown_toml_is_an_error() {
        assert!(parse_config("policy = 3").is_err());
    }
}
