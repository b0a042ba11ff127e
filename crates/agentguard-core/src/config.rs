//! Policy validation.
//!
//! Configuration is fully validated before any scanning begins; the caller
//! gets the complete error list rather than the first failure.

use agentguard_domain::builtin_rules;
use agentguard_types::AuditConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("policy.min_confidence must be within [0, 1], got {0}")]
    MinConfidenceOutOfRange(String),

    #[error("policy.warn_threshold must not exceed policy.fail_threshold")]
    ThresholdsInverted,

    #[error("scan.max_files must be greater than zero")]
    ZeroMaxFiles,

    #[error("rules.{field} references unknown rule id '{rule_id}'")]
    UnknownRuleId { field: &'static str, rule_id: String },

    #[error("output.format '{0}' is not one of text, json, sarif")]
    UnknownOutputFormat(String),
}

/// Validates the whole policy object, returning every problem found.
pub fn validate_config(config: &AuditConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(0.0..=1.0).contains(&config.policy.min_confidence) {
        errors.push(ConfigError::MinConfidenceOutOfRange(
            config.policy.min_confidence.to_string(),
        ));
    }

    if config.policy.warn_threshold > config.policy.fail_threshold {
        errors.push(ConfigError::ThresholdsInverted);
    }

    if config.scan.max_files == 0 {
        errors.push(ConfigError::ZeroMaxFiles);
    }

    let known: Vec<&'static str> = builtin_rules().iter().map(|r| r.meta().id).collect();
    for id in &config.rules.disabled {
        if !known.contains(&id.as_str()) {
            errors.push(ConfigError::UnknownRuleId {
                field: "disabled",
                rule_id: id.clone(),
            });
        }
    }
    for id in config.rules.severity_overrides.keys() {
        if !known.contains(&id.as_str()) {
            errors.push(ConfigError::UnknownRuleId {
                field: "severity_overrides",
                rule_id: id.clone(),
            });
        }
    }

    if let Some(format) = &config.output.format {
        if !matches!(format.as_str(), "text" | "json" | "sarif") {
            errors.push(ConfigError::UnknownOutputFormat(format.clone()));
        }
    }

    errors
}
