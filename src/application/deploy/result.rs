//! Deployment Report
//!
//! Outcome of one trigger of the orchestrator.

use std::time::Duration;

use crate::domain::ports::DeployStep;
use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStatus {
    Succeeded,
    /// A pipeline step failed; finalization still ran
    Failed {
        step: DeployStep,
        message: String,
    },
    /// Another deployment was in flight, nothing was done
    Skipped,
}

/// Result of a deployment run
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub status: DeploymentStatus,
    /// Deployment sequence number, `None` when skipped
    pub sequence: Option<u64>,
    /// Time spent inside the locked region
    pub elapsed: Duration,
    pub dependencies_uploaded: usize,
    pub files_uploaded: usize,
    pub files_excluded: usize,
    pub directories_created: usize,
    pub bytes_uploaded: u64,
    /// Reported-but-continued failures (pre/post command)
    pub warnings: Vec<String>,
}

impl DeploymentReport {
    pub(crate) fn new() -> Self {
        Self {
            status: DeploymentStatus::Succeeded,
            sequence: None,
            elapsed: Duration::ZERO,
            dependencies_uploaded: 0,
            files_uploaded: 0,
            files_excluded: 0,
            directories_created: 0,
            bytes_uploaded: 0,
            warnings: Vec::new(),
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: DeploymentStatus::Skipped,
            ..Self::new()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Succeeded
    }

    pub fn is_skipped(&self) -> bool {
        self.status == DeploymentStatus::Skipped
    }

    pub fn failure(&self) -> Option<(DeployStep, &str)> {
        match &self.status {
            DeploymentStatus::Failed { step, message } => Some((*step, message.as_str())),
            _ => None,
        }
    }

    /// Turn a failed report into an error, keeping successful and skipped
    /// reports.
    pub fn into_result(self) -> DeployResult<Self> {
        match &self.status {
            DeploymentStatus::Failed { message, .. } => Err(DeployError::PipelineFailed {
                sequence: self.sequence.unwrap_or_default(),
                message: message.clone(),
            }),
            _ => Ok(self),
        }
    }
}
