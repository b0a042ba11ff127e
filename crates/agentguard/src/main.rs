use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use agentguard_baseline::BaselineError;
use agentguard_core::{
    render_markdown_for_report, render_sarif_json, run_scan, validate_config, ScanError,
    ScanOutcome,
};
use agentguard_diff::diff_scans;
use agentguard_domain::builtin_rules;
use agentguard_types::{
    AuditConfig, BaselineFile, ScanReport, EXIT_CONFIG, EXIT_INTERNAL, EXIT_PARSE, EXIT_PASS,
    EXIT_USAGE,
};

mod config_loader;
mod discovery;

use config_loader::load_config;
use discovery::discover;

#[derive(Parser)]
#[command(name = "agentguard")]
#[command(about = "Security audit for declarative AI-agent configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan agent configuration under a directory.
    Scan(ScanArgs),

    /// Compare two saved scan reports and gate on behavioral expansion.
    Diff(DiffArgs),

    /// Manage the accepted-findings baseline.
    Baseline(BaselineArgs),

    /// List the builtin rules.
    Rules,

    /// Show detailed information about a specific rule.
    Explain(ExplainArgs),

    /// Validate a policy file without scanning.
    Validate(ValidateArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Sarif,
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Directory to scan.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Policy file (TOML). Defaults to agentguard.toml in the root if present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Baseline file used to suppress accepted findings.
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Escalate parse errors to a fail verdict.
    #[arg(long)]
    strict: bool,

    /// Override policy.min_confidence.
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Write the rendered report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DiffArgs {
    /// Base scan report (JSON, as written by `scan --format json`).
    #[arg(long)]
    base: PathBuf,

    /// Target scan report (JSON).
    #[arg(long)]
    target: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct BaselineArgs {
    #[command(subcommand)]
    action: BaselineAction,
}

#[derive(Subcommand)]
enum BaselineAction {
    /// Replace the baseline with the current findings.
    Create(BaselineActionArgs),
    /// Add current findings not yet baselined (append-only).
    Update(BaselineActionArgs),
    /// Drop baseline entries matching no current finding.
    Prune(BaselineActionArgs),
}

#[derive(clap::Args)]
struct BaselineActionArgs {
    /// Directory to scan.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Baseline file path.
    #[arg(long, default_value = ".agentguard-baseline.json")]
    file: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ExplainArgs {
    /// Rule id, e.g. shell.dynamic_exec.
    rule_id: String,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Policy file (TOML).
    #[arg(long, default_value = config_loader::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            EXIT_INTERNAL
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Scan(args) => cmd_scan(args),
        Commands::Diff(args) => cmd_diff(args),
        Commands::Baseline(args) => match args.action {
            BaselineAction::Create(a) => cmd_baseline(a, BaselineOp::Create),
            BaselineAction::Update(a) => cmd_baseline(a, BaselineOp::Update),
            BaselineAction::Prune(a) => cmd_baseline(a, BaselineOp::Prune),
        },
        Commands::Rules => cmd_rules(),
        Commands::Explain(args) => cmd_explain(args),
        Commands::Validate(args) => cmd_validate(args),
    }
}

fn cmd_scan(args: ScanArgs) -> Result<i32> {
    let mut config = match load_config(args.config.as_deref(), &args.root) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err:#}");
            return Ok(EXIT_CONFIG);
        }
    };
    if args.strict {
        config.policy.strict = true;
    }
    if let Some(min_confidence) = args.min_confidence {
        config.policy.min_confidence = min_confidence;
    }

    let inputs = discover(&args.root, &config.scan.include, &config.scan.exclude)?;
    if inputs.is_empty() {
        eprintln!("no agent configuration files found under {}", args.root.display());
        return Ok(EXIT_PARSE);
    }
    debug!(files = inputs.len(), "discovered scan inputs");

    let baseline_path = args
        .baseline
        .clone()
        .or_else(|| config.baseline.path.as_ref().map(PathBuf::from));
    let baseline = match baseline_path {
        Some(path) => match load_baseline(&path) {
            Ok(baseline) => Some(baseline),
            Err(code) => return Ok(code),
        },
        None => None,
    };

    let outcome = match run_scan(&inputs, &config, baseline.as_ref()) {
        Ok(outcome) => outcome,
        Err(err) => return Ok(scan_error_exit(&err)),
    };

    let rendered = render(&outcome, args.format);
    emit(&rendered, args.output.as_deref())?;

    Ok(outcome.report.verdict.status.exit_code())
}

fn scan_error_exit(err: &ScanError) -> i32 {
    match err {
        ScanError::Config(errors) => {
            for e in errors {
                eprintln!("config error: {e}");
            }
            EXIT_CONFIG
        }
        ScanError::TooManyFiles { .. } => {
            eprintln!("error: {err}");
            EXIT_USAGE
        }
    }
}

fn load_baseline(path: &Path) -> Result<BaselineFile, i32> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("config error: baseline {} unreadable: {err}", path.display());
            return Err(EXIT_CONFIG);
        }
    };
    match agentguard_baseline::load(&text) {
        Ok(baseline) => Ok(baseline),
        Err(err @ BaselineError::Parse(_)) | Err(err @ BaselineError::Version { .. }) => {
            eprintln!("baseline error: {err}");
            Err(EXIT_PARSE)
        }
    }
}

fn render(outcome: &ScanOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_markdown_for_report(&outcome.report),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&outcome.report).expect("report serializes");
            json.push('\n');
            json
        }
        OutputFormat::Sarif => render_sarif_json(&outcome.report),
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
        }
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs) -> Result<i32> {
    let config = match load_config(args.config.as_deref(), Path::new(".")) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err:#}");
            return Ok(EXIT_CONFIG);
        }
    };

    let base = match load_report(&args.base) {
        Ok(report) => report,
        Err(code) => return Ok(code),
    };
    let target = match load_report(&args.target) {
        Ok(report) => report,
        Err(code) => return Ok(code),
    };

    let report = diff_scans(
        &base.summary,
        &base.findings,
        &target.summary,
        &target.findings,
        &config.diff,
    );

    let mut json = serde_json::to_string_pretty(&report).expect("diff serializes");
    json.push('\n');
    print!("{json}");

    Ok(report.verdict.status.exit_code())
}

fn load_report(path: &Path) -> Result<ScanReport, i32> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: report {} unreadable: {err}", path.display());
            return Err(EXIT_USAGE);
        }
    };
    match serde_json::from_str(&text) {
        Ok(report) => Ok(report),
        Err(err) => {
            eprintln!("error: report {} is not a scan report: {err}", path.display());
            Err(EXIT_PARSE)
        }
    }
}

enum BaselineOp {
    Create,
    Update,
    Prune,
}

fn cmd_baseline(args: BaselineActionArgs, op: BaselineOp) -> Result<i32> {
    let config = match load_config(args.config.as_deref(), &args.root) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err:#}");
            return Ok(EXIT_CONFIG);
        }
    };

    let inputs = discover(&args.root, &config.scan.include, &config.scan.exclude)?;
    if inputs.is_empty() {
        eprintln!("no agent configuration files found under {}", args.root.display());
        return Ok(EXIT_PARSE);
    }

    let outcome = match run_scan(&inputs, &config, None) {
        Ok(outcome) => outcome,
        Err(err) => return Ok(scan_error_exit(&err)),
    };

    let now = Utc::now().to_rfc3339();
    let next = match op {
        BaselineOp::Create => agentguard_baseline::create(&outcome.report.findings, &now),
        BaselineOp::Update | BaselineOp::Prune => {
            let existing = match load_baseline(&args.file) {
                Ok(baseline) => baseline,
                Err(code) => return Ok(code),
            };
            match op {
                BaselineOp::Update => {
                    agentguard_baseline::update(&existing, &outcome.report.findings, &now)
                }
                _ => agentguard_baseline::prune(&existing, &outcome.report.findings, &now),
            }
        }
    };

    std::fs::write(&args.file, agentguard_baseline::save(&next))
        .with_context(|| format!("writing {}", args.file.display()))?;
    println!(
        "baseline {} now holds {} finding(s)",
        args.file.display(),
        next.findings.len()
    );
    Ok(EXIT_PASS)
}

fn cmd_rules() -> Result<i32> {
    for rule in builtin_rules() {
        let meta = rule.meta();
        println!("{:<36} {:<8} {}", meta.id, meta.severity.as_str(), meta.title);
    }
    Ok(EXIT_PASS)
}

fn cmd_explain(args: ExplainArgs) -> Result<i32> {
    let rules = builtin_rules();
    let Some(rule) = rules.iter().find(|r| r.meta().id == args.rule_id) else {
        eprintln!("unknown rule id '{}'", args.rule_id);
        return Ok(EXIT_USAGE);
    };

    let meta = rule.meta();
    println!("{} ({})", meta.id, meta.severity.as_str());
    println!("\n{}\n", meta.title);
    println!("{}\n", meta.description);
    println!("Recommendation: {}", meta.recommendation);
    if !meta.tags.is_empty() {
        println!("Tags: {}", meta.tags.join(", "));
    }
    Ok(EXIT_PASS)
}

fn cmd_validate(args: ValidateArgs) -> Result<i32> {
    let text = match std::fs::read_to_string(&args.config) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("config error: reading {}: {err}", args.config.display());
            return Ok(EXIT_CONFIG);
        }
    };
    let config: AuditConfig = match config_loader::parse_config(&text) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err:#}");
            return Ok(EXIT_CONFIG);
        }
    };

    let errors = validate_config(&config);
    if errors.is_empty() {
        println!("configuration OK");
        Ok(EXIT_PASS)
    } else {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        Ok(EXIT_CONFIG)
    }
}
