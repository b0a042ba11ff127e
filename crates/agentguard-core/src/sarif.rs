//! SARIF (Static Analysis Results Interchange Format) output renderer.
//!
//! Converts a ScanReport to SARIF 2.1.0 for integration with code scanning
//! tools and GitHub Advanced Security.

use std::collections::BTreeMap;

use serde::Serialize;

use agentguard_domain::builtin_rules;
use agentguard_types::{Finding, ScanReport, Severity};

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";
const INFO_URI: &str = "https://github.com/effortless-mgmt/agentguard";

#[derive(Debug, Clone, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub short_description: SarifMessage,
    pub default_configuration: SarifRuleConfiguration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifRuleConfiguration {
    pub level: SarifLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: SarifLevel,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub partial_fingerprints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    Error,
    Warning,
    Note,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: u32,
    pub end_line: u32,
}

fn level_for(severity: Severity) -> SarifLevel {
    match severity {
        Severity::High => SarifLevel::Error,
        Severity::Medium => SarifLevel::Warning,
        Severity::Low | Severity::Info => SarifLevel::Note,
    }
}

fn result_for(finding: &Finding) -> SarifResult {
    let mut partial_fingerprints = BTreeMap::new();
    partial_fingerprints.insert(
        "stableFingerprint/v1".to_string(),
        finding.fingerprints.stable.clone(),
    );

    SarifResult {
        rule_id: finding.rule_id.clone(),
        level: level_for(finding.severity),
        message: SarifMessage {
            text: finding.message.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: finding.path.clone(),
                },
                region: SarifRegion {
                    start_line: finding.start_line,
                    end_line: finding.end_line,
                },
            },
        }],
        partial_fingerprints,
    }
}

pub fn render_sarif_for_report(report: &ScanReport) -> SarifReport {
    let rules = builtin_rules()
        .iter()
        .map(|r| {
            let meta = r.meta();
            SarifRule {
                id: meta.id.to_string(),
                short_description: SarifMessage {
                    text: meta.title.to_string(),
                },
                default_configuration: SarifRuleConfiguration {
                    level: level_for(meta.severity),
                },
            }
        })
        .collect();

    SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: report.tool.name.clone(),
                    version: report.tool.version.clone(),
                    information_uri: INFO_URI.to_string(),
                    rules,
                },
            },
            results: report.findings.iter().map(result_for).collect(),
        }],
    }
}

pub fn render_sarif_json(report: &ScanReport) -> String {
    serde_json::to_string_pretty(&render_sarif_for_report(report)).expect("sarif serializes")
}
