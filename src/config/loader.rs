//! Configuration loading and environment overrides

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};

use super::types::Config;

/// Project config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sshdeploy.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| DeployError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let mut config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| DeployError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config.origin = Some(path.to_path_buf());

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit file, else `sshdeploy.toml` in `working_dir`, else defaults.
///
/// An explicit file that cannot be read is an error; a missing default file
/// is not.
pub fn discover(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    if let Some(path) = explicit {
        return load_with_warnings(path);
    }

    let project_config = working_dir.join(DEFAULT_CONFIG_FILE);
    if project_config.is_file() {
        return load_with_warnings(&project_config);
    }

    tracing::debug!("no config file found, using defaults");
    Ok((Config::default(), Vec::new()))
}

/// Apply environment variable overrides (SSHDEPLOY_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Same as [`with_env_overrides`] with an explicit variable lookup.
pub fn with_env_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = non_empty("SSHDEPLOY_HOST") {
        config.connection.host = Some(host);
    }

    if let Some(port) = non_empty("SSHDEPLOY_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.connection.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid SSHDEPLOY_PORT"),
        }
    }

    if let Some(username) = non_empty("SSHDEPLOY_USERNAME") {
        config.connection.username = Some(username);
    }

    if let Some(target) = non_empty("SSHDEPLOY_TARGET") {
        config.deploy.target = Some(target);
    }

    if let Some(store) = non_empty("SSHDEPLOY_PACKAGE_STORE") {
        config.deploy.package_store = Some(PathBuf::from(store));
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "connection",
        "host",
        "port",
        "username",
        "identity_file",
        "multiplex",
        "deploy",
        "source",
        "target",
        "exclude",
        "pre_command",
        "post_command",
        "clean",
        "configuration",
        "framework",
        "runtime_identifier",
        "package_store",
        "pre_command_timeout_secs",
        "strict_pre_command",
        "forward_shell_output",
        "shell_grace_secs",
        "monitor",
        "trigger_file",
        "debounce_ms",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
