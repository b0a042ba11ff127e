//! Markdown rendering of a scan report.

use agentguard_types::{Finding, GateStatus, ScanReport};

pub fn render_markdown_for_report(report: &ScanReport) -> String {
    let status = match report.verdict.status {
        GateStatus::Pass => "PASS",
        GateStatus::Warn => "WARN",
        GateStatus::Fail => "FAIL",
    };

    let mut out = String::new();
    out.push_str(&format!("## agentguard — {status}\n\n"));

    out.push_str(&format!(
        "Scanned **{}** document(s), **{}** finding(s)\n\n",
        report.documents.len(),
        report.findings.len()
    ));

    if !report.verdict.reasons.is_empty() {
        out.push_str("**Verdict reasons:**\n");
        for reason in &report.verdict.reasons {
            out.push_str(&format!("- {reason}\n"));
        }
        out.push('\n');
    }

    if let Some(stats) = &report.baseline {
        out.push_str(&format!(
            "**Baseline:** {} suppressed, {} new, {} fixed.\n\n",
            stats.suppressed, stats.new_findings, stats.fixed
        ));
    }

    if !report.issues.is_empty() {
        out.push_str(&format!(
            "**Note:** {} issue(s) accumulated during the scan.\n\n",
            report.issues.len()
        ));
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("| Severity | Rule | Location | Message |\n");
    out.push_str("|---|---|---|---|\n");
    for finding in &report.findings {
        out.push_str(&render_finding_row(finding));
    }
    out.push('\n');

    out.push_str("### Recommended permissions\n\n");
    out.push_str(&format!(
        "- shell: `{}`\n- network: `{}`\n- write paths: {}\n- secrets: none\n",
        report.manifest.shell,
        report.manifest.network,
        if report.manifest.write_paths.is_empty() {
            "none".to_string()
        } else {
            report
                .manifest
                .write_paths
                .iter()
                .map(|p| format!("`{p}`"))
                .collect::<Vec<_>>()
                .join(", ")
        }
    ));

    out
}

fn render_finding_row(finding: &Finding) -> String {
    format!(
        "| {} | `{}` | `{}:{}` | {} |\n",
        finding.severity.as_str(),
        finding.rule_id,
        finding.path,
        finding.start_line,
        escape_pipes(&finding.message)
    )
}

fn escape_pipes(s: &str) -> String {
    s.replace('|', "\\|")
}
