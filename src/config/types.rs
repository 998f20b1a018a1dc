//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ConnectionInfo, DeploymentConfig, DEFAULT_RUNTIME_IDENTIFIER};
use crate::domain::value_objects::ExclusionRules;
use crate::error::{DeployError, DeployResult};

use super::loader::{self, ConfigWarning, DEFAULT_CONFIG_FILE};

/// `[connection]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    #[serde(default = "default_multiplex")]
    pub multiplex: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            username: None,
            identity_file: None,
            multiplex: default_multiplex(),
        }
    }
}

fn default_port() -> u16 {
    22
}

fn default_multiplex() -> bool {
    cfg!(unix)
}

/// `[deploy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub target: Option<String>,

    /// File name suffixes never uploaded
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub pre_command: String,

    #[serde(default)]
    pub post_command: String,

    #[serde(default)]
    pub clean: bool,

    #[serde(default = "default_configuration")]
    pub configuration: String,

    #[serde(default)]
    pub framework: String,

    #[serde(default = "default_runtime_identifier")]
    pub runtime_identifier: String,

    #[serde(default)]
    pub package_store: Option<PathBuf>,

    #[serde(default)]
    pub pre_command_timeout_secs: Option<u64>,

    #[serde(default)]
    pub strict_pre_command: bool,

    #[serde(default = "default_true")]
    pub forward_shell_output: bool,

    #[serde(default = "default_shell_grace_secs")]
    pub shell_grace_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            exclude: Vec::new(),
            pre_command: String::new(),
            post_command: String::new(),
            clean: false,
            configuration: default_configuration(),
            framework: String::new(),
            runtime_identifier: default_runtime_identifier(),
            package_store: None,
            pre_command_timeout_secs: None,
            strict_pre_command: false,
            forward_shell_output: true,
            shell_grace_secs: default_shell_grace_secs(),
        }
    }
}

fn default_configuration() -> String {
    "Debug".to_string()
}

fn default_runtime_identifier() -> String {
    DEFAULT_RUNTIME_IDENTIFIER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_shell_grace_secs() -> u64 {
    2
}

/// `[monitor]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub trigger_file: Option<PathBuf>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            trigger_file: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    crate::application::DEBOUNCE_MS
}

/// Values given on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub target: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub pre_command: Option<String>,
    pub post_command: Option<String>,
    pub clean: Option<bool>,
    pub configuration: Option<String>,
    pub framework: Option<String>,
    pub runtime_identifier: Option<String>,
    pub package_store: Option<PathBuf>,
    pub trigger_file: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    /// File this configuration was read from
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Explicit file, `./sshdeploy.toml` when present, or defaults
    pub fn discover(
        explicit: Option<&Path>,
        working_dir: &Path,
    ) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit, working_dir)
    }

    /// Apply environment variable overrides (SSHDEPLOY_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Apply command line values on top of everything else
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        let o = overrides.clone();
        let c = &mut self.connection;
        c.host = o.host.or(c.host.take());
        c.port = o.port.unwrap_or(c.port);
        c.username = o.username.or(c.username.take());
        c.identity_file = o.identity_file.or(c.identity_file.take());

        let d = &mut self.deploy;
        d.source = o.source.or(d.source.take());
        d.target = o.target.or(d.target.take());
        if let Some(exclude) = o.exclude {
            d.exclude = exclude;
        }
        if let Some(pre) = o.pre_command {
            d.pre_command = pre;
        }
        if let Some(post) = o.post_command {
            d.post_command = post;
        }
        d.clean = o.clean.unwrap_or(d.clean);
        if let Some(configuration) = o.configuration {
            d.configuration = configuration;
        }
        if let Some(framework) = o.framework {
            d.framework = framework;
        }
        if let Some(rid) = o.runtime_identifier {
            d.runtime_identifier = rid;
        }
        d.package_store = o.package_store.or(d.package_store.take());

        self.monitor.trigger_file = o.trigger_file.or(self.monitor.trigger_file.take());
        self
    }

    /// Build the immutable per-run configuration.
    ///
    /// Host, source and target are required.
    pub fn deployment_config(&self) -> DeployResult<DeploymentConfig> {
        let host = require(self, self.connection.host.as_deref(), "connection.host")?;
        let source = match &self.deploy.source {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => return Err(missing(self, "deploy.source")),
        };
        let target = require(self, self.deploy.target.as_deref(), "deploy.target")?;

        let mut connection = ConnectionInfo::new(host).with_port(self.connection.port);
        if let Some(user) = &self.connection.username {
            connection = connection.with_username(user.as_str());
        }
        if let Some(identity) = &self.connection.identity_file {
            connection = connection.with_identity_file(identity.as_path());
        }
        connection.multiplex = self.connection.multiplex;

        let d = &self.deploy;
        let mut config = DeploymentConfig::new(source, target, connection)
            .with_exclusions(ExclusionRules::new(d.exclude.iter().map(String::as_str)))
            .with_pre_command(d.pre_command.as_str())
            .with_post_command(d.post_command.as_str())
            .with_clean_target(d.clean)
            .with_runtime_identifier(d.runtime_identifier.as_str())
            .with_strict_pre_command(d.strict_pre_command);
        if let Some(store) = &d.package_store {
            config = config.with_package_store(store.as_path());
        }
        config.configuration = d.configuration.clone();
        config.framework = d.framework.clone();
        config.pre_command_timeout = d.pre_command_timeout_secs.map(Duration::from_secs);
        config.forward_shell_output = d.forward_shell_output;
        config.shell_grace = Duration::from_secs(d.shell_grace_secs);

        Ok(config.normalized())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.monitor.debounce_ms)
    }
}

fn require<'c>(config: &Config, value: Option<&'c str>, key: &str) -> DeployResult<&'c str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing(config, key)),
    }
}

fn missing(config: &Config, key: &str) -> DeployError {
    DeployError::Config {
        file: config
            .origin
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        message: format!("missing required setting '{}'", key),
    }
}
