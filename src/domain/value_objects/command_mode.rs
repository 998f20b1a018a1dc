//! Remote command execution mode

use std::fmt;
use std::str::FromStr;

/// How a remote command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMode {
    /// Run and block until the remote process exits
    Client,
    /// Send into a long-lived shell session without waiting for exit
    Shell,
}

impl CommandMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandMode::Client => "client",
            CommandMode::Shell => "shell",
        }
    }
}

impl fmt::Display for CommandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(CommandMode::Client),
            "shell" => Ok(CommandMode::Shell),
            other => Err(format!("unknown command mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Client".parse::<CommandMode>(), Ok(CommandMode::Client));
        assert_eq!(" shell ".parse::<CommandMode>(), Ok(CommandMode::Shell));
        assert!("tty".parse::<CommandMode>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(CommandMode::Shell.to_string(), "shell");
    }
}
