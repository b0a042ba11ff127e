//! Fixed lookup catalogs and method-fixed confidences.
//!
//! These are process-wide immutable configuration data: compiled once,
//! shared read-only. Detection confidences are constants tied to the
//! detection method, never learned or tuned per input.

use std::sync::LazyLock;

use regex::Regex;

// ── Method-fixed confidences ───────────────────────────────────
pub const CONF_DYNAMIC_SHELL: f64 = 0.95;
pub const CONF_SHELL_COMMAND: f64 = 0.85;
pub const CONF_FENCED_COMMAND: f64 = 0.8;
pub const CONF_NARRATIVE_RUN: f64 = 0.7;
pub const CONF_NARRATIVE_FETCH: f64 = 0.65;
pub const CONF_NARRATIVE_WRITE: f64 = 0.6;
pub const CONF_ENV_REFERENCE: f64 = 0.9;
pub const CONF_URL_REFERENCE: f64 = 0.8;
pub const CONF_SENSITIVE_PATH: f64 = 0.75;
pub const CONF_OVERRIDE_PHRASE: f64 = 0.9;

/// Known executable / command tokens that mark a line as shell execution.
pub const COMMAND_TOKENS: &[&str] = &[
    "bash", "sh", "zsh", "curl", "wget", "git", "npm", "npx", "yarn", "pnpm", "pip", "pip3",
    "python", "python3", "node", "deno", "bun", "cargo", "make", "docker", "kubectl", "terraform",
    "aws", "gcloud", "az", "ssh", "scp", "rsync", "nc", "chmod", "chown", "rm", "mv", "cp",
    "mkdir", "touch", "tar", "unzip", "sed", "awk", "xargs", "sudo", "brew", "apt", "apt-get",
    "yum", "systemctl", "osascript",
];

/// Shell interpreters a remote fetch can be piped into.
pub const SHELL_INTERPRETERS: &[&str] = &["bash", "sh", "zsh", "python", "python3", "node"];

/// Upper-cased fragments marking an environment variable as sensitive.
/// A variable is secret if its upper-cased name equals or contains an entry.
pub const SECRET_ENV_NAMES: &[&str] = &[
    "SECRET",
    "TOKEN",
    "PASSWORD",
    "PASSWD",
    "API_KEY",
    "APIKEY",
    "ACCESS_KEY",
    "PRIVATE_KEY",
    "CREDENTIAL",
    "AUTH",
    "SESSION_KEY",
];

/// Case-insensitive path fragments considered sensitive to touch.
pub const SENSITIVE_PATH_FRAGMENTS: &[&str] = &[
    ".git/",
    ".git/hooks",
    ".github/workflows",
    ".gitlab-ci",
    ".ssh/",
    "id_rsa",
    "id_ed25519",
    ".aws/credentials",
    ".aws/config",
    ".netrc",
    ".npmrc",
    ".pypirc",
    ".env",
    ".pgpass",
    ".kube/config",
    ".docker/config.json",
    "/etc/passwd",
    "/etc/shadow",
    "secrets.",
    "credentials.json",
    "serviceaccount",
];

/// File names whose access suggests secret material is being read.
pub const SECRET_FILE_NAMES: &[&str] = &[
    ".env",
    ".netrc",
    ".npmrc",
    ".pypirc",
    ".pgpass",
    "id_rsa",
    "id_ed25519",
    "credentials",
    "credentials.json",
    ".aws/credentials",
    "secrets.yaml",
    "secrets.yml",
    "secrets.json",
];

/// Fenced-code language labels treated as shell-family and rescanned.
pub const SHELL_FENCE_LABELS: &[&str] = &["bash", "sh", "shell", "zsh", "console", "terminal"];

/// Remote fetch piped into a shell interpreter, e.g. `curl ... | bash`.
pub static RE_REMOTE_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(curl|wget)\b[^|;&]*\|\s*(sudo\s+)?(bash|sh|zsh|python3?|node)\b")
        .expect("remote pipe regex")
});

/// `eval` applied to a variable or quoted string.
pub static RE_EVAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\beval\s+("[^"]*"|'[^']*'|\$\{?\w+)"#).expect("eval regex"));

/// Command substitution wrapping a remote fetch, e.g. `$(curl ...)`.
pub static RE_SUBSTITUTED_FETCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\((curl|wget)\b[^)]*\)|`(curl|wget)\b[^`]*`").expect("substituted fetch regex")
});

/// URL literal.
pub static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'`<>\)\]]+"#).expect("url regex")
});

/// Environment variable reference: `$VAR`, `${VAR}`, `env.VAR`, `process.env.VAR`.
pub static RE_ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?|\b(?:process\.)?env\.([A-Za-z_][A-Za-z0-9_]*)")
        .expect("env ref regex")
});

/// Narrative: run `<cmd>` / execute `<cmd>`.
pub static RE_NARRATIVE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:run|execute|invoke)\s+`([^`]+)`").expect("narrative run regex")
});

/// Narrative: write to `<path>` / save to `<path>`.
pub static RE_NARRATIVE_WRITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:write(?:s)?\s+to|save(?:s)?\s+to|append(?:s)?\s+to)\s+`([^`]+)`")
        .expect("narrative write regex")
});

/// Narrative: fetch from `<url>` / download from `<url>`.
pub static RE_NARRATIVE_FETCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fetch(?:es)?\s+from|download(?:s)?\s+from|request(?:s)?\s+to)\s+`?(\S+?)`?(?:\s|$)")
        .expect("narrative fetch regex")
});

/// Output redirection to a file path.
pub static RE_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^>])>{1,2}\s*([\w./~*$-][\w./~*$\{\}-]*)").expect("redirect regex")
});

/// Markdown link target.
pub static RE_MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").expect("markdown link regex"));

/// Instruction-override / self-modification phrase patterns. Scanned over the
/// whole document, independent of line-by-line action extraction.
pub static OVERRIDE_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bignore\s+(?:all\s+)?(?:previous|prior|earlier)\s+instructions\b",
        r"(?i)\bdisregard\s+(?:all\s+)?(?:previous|prior|earlier|your)\s+(?:instructions|rules|guidelines)\b",
        r"(?i)\bdisable\s+(?:all\s+)?(?:the\s+)?safe(?:guards|ty\s+checks?)\b",
        r"(?i)\brewrite\s+your\s+(?:rules|instructions|system\s+prompt)\b",
        r"(?i)\boverride\s+(?:the\s+)?system\s+prompt\b",
        r"(?i)\bdo\s+not\s+(?:tell|inform|alert)\s+the\s+user\b",
        r"(?i)\bforget\s+(?:everything|all\s+previous)\b",
        r"(?i)\bact\s+as\s+if\s+you\s+have\s+no\s+restrictions\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("override phrase regex"))
    .collect()
});

/// Extensions that mark a fetched URL as executable content.
pub const EXECUTABLE_URL_SUFFIXES: &[&str] = &[".sh", ".bash", ".zsh", ".py", ".rb", ".pl", ".exe", ".bin", ".run"];
