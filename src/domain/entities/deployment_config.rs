//! Deployment configuration entity
//!
//! Immutable per run. Assembled by the config layer from CLI flags,
//! environment and the project config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::value_objects::{ExclusionRules, RemotePath};

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Runtime identifier fragment used to pick the dependency graph
pub const DEFAULT_RUNTIME_IDENTIFIER: &str = "linux-arm";

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    /// Private key passed to `ssh -i`
    pub identity_file: Option<PathBuf>,
    /// Reuse one control connection for every remote operation
    pub multiplex: bool,
}

impl ConnectionInfo {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: None,
            identity_file: None,
            multiplex: cfg!(unix),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// `host:port`, as shown to the operator
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `user@host` or `host`, as passed to ssh
    pub fn destination(&self) -> String {
        match &self.username {
            Some(user) if !user.is_empty() => format!("{}@{}", user, self.host),
            _ => self.host.clone(),
        }
    }
}

/// Everything a single deployment run needs.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub source: PathBuf,
    pub target: String,
    pub connection: ConnectionInfo,
    pub exclusions: ExclusionRules,
    pub pre_command: String,
    pub post_command: String,
    pub clean_target: bool,
    /// Build configuration label (`Debug`, `Release`)
    pub configuration: String,
    /// Target framework label (`net8.0`)
    pub framework: String,
    /// Fragment matched against manifest target keys
    pub runtime_identifier: String,
    /// Overrides the package store locator
    pub package_store: Option<PathBuf>,
    pub pre_command_timeout: Option<Duration>,
    /// Abort the pipeline when the pre-command fails
    pub strict_pre_command: bool,
    /// Keep relaying post-command shell output after the pipeline ends
    pub forward_shell_output: bool,
    /// How long a closing shell session may take before it is killed
    pub shell_grace: Duration,
}

impl DeploymentConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<String>,
        connection: ConnectionInfo,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            connection,
            exclusions: ExclusionRules::default(),
            pre_command: String::new(),
            post_command: String::new(),
            clean_target: false,
            configuration: "Debug".to_string(),
            framework: String::new(),
            runtime_identifier: DEFAULT_RUNTIME_IDENTIFIER.to_string(),
            package_store: None,
            pre_command_timeout: None,
            strict_pre_command: false,
            forward_shell_output: true,
            shell_grace: Duration::from_secs(2),
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionRules) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_pre_command(mut self, command: impl Into<String>) -> Self {
        self.pre_command = command.into();
        self
    }

    pub fn with_post_command(mut self, command: impl Into<String>) -> Self {
        self.post_command = command.into();
        self
    }

    pub fn with_clean_target(mut self, clean: bool) -> Self {
        self.clean_target = clean;
        self
    }

    pub fn with_package_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.package_store = Some(path.into());
        self
    }

    pub fn with_strict_pre_command(mut self, strict: bool) -> Self {
        self.strict_pre_command = strict;
        self
    }

    pub fn with_runtime_identifier(mut self, rid: impl Into<String>) -> Self {
        self.runtime_identifier = rid.into();
        self
    }

    /// Copy with the target path trimmed of surrounding whitespace.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.target = config.target.trim().to_string();
        config
    }

    pub fn target_path(&self) -> RemotePath {
        RemotePath::new(&self.target)
    }
}
