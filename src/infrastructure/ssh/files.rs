//! File channel over `ssh` + POSIX shell commands

use std::io::Read;
use std::sync::Arc;

use crate::domain::ports::{ChannelResult, FileChannel, RemoteEntry};
use crate::domain::value_objects::RemotePath;

use super::classify_failure;
use super::session::SshControl;

pub(crate) struct SshFileChannel {
    control: Arc<SshControl>,
}

impl SshFileChannel {
    pub(crate) fn new(control: Arc<SshControl>) -> Self {
        Self { control }
    }

    fn run_checked(&self, remote_command: &str, path: &RemotePath) -> ChannelResult<String> {
        let (output, _) = self.control.target.run(remote_command, None, None)?;
        if output.is_success() {
            Ok(output.output)
        } else {
            Err(classify_failure(path.as_str(), &output))
        }
    }
}

impl FileChannel for SshFileChannel {
    fn upload(&self, source: &mut dyn Read, remote_path: &RemotePath) -> ChannelResult<u64> {
        let command = format!("cat > {}", remote_path.shell_quoted());
        let (output, written) = self.control.target.run(&command, Some(source), None)?;
        if !output.is_success() {
            return Err(classify_failure(remote_path.as_str(), &output));
        }
        Ok(written)
    }

    fn exists(&self, remote_path: &RemotePath) -> ChannelResult<bool> {
        let command = format!("test -e {}", remote_path.shell_quoted());
        let (output, _) = self.control.target.run(&command, None, None)?;
        Ok(output.is_success())
    }

    fn create_directory(&self, remote_path: &RemotePath) -> ChannelResult<()> {
        let command = format!("mkdir {}", remote_path.shell_quoted());
        self.run_checked(&command, remote_path).map(|_| ())
    }

    fn delete(&self, remote_path: &RemotePath) -> ChannelResult<()> {
        let p = remote_path.shell_quoted();
        let command = format!(
            "if [ -d {p} ] && [ ! -L {p} ]; then rmdir {p}; else rm {p}; fi"
        );
        self.run_checked(&command, remote_path).map(|_| ())
    }

    fn list_entries(&self, remote_path: &RemotePath) -> ChannelResult<Vec<RemoteEntry>> {
        let command = format!("ls -1Ap {}", remote_path.shell_quoted());
        let listing = self.run_checked(&command, remote_path)?;
        Ok(parse_listing(remote_path, &listing))
    }
}

/// Parse `ls -1Ap` output; directories carry a trailing `/`.
fn parse_listing(dir: &RemotePath, listing: &str) -> Vec<RemoteEntry> {
    let mut entries = Vec::new();
    for line in listing.lines().map(|l| l.trim_end_matches('\r')) {
        if line.is_empty() {
            continue;
        }
        let entry = match line.strip_suffix('/') {
            Some(name) => RemoteEntry::directory(dir.join(name)),
            None => RemoteEntry::file(dir.join(line)),
        };
        entries.push(entry);
    }
    entries
}
