//! Jobs tracked by the storage service.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::ContentAddress;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid identifier '{input}': {reason}")]
pub struct JobIdError {
    input: String,
    reason: String,
}

impl JobIdError {
    fn new(input: &str, err: uuid::Error) -> Self {
        Self {
            input: input.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Identifier the service assigns when it accepts a push or replace.
///
/// The empty string is reserved for [`JobId::EMPTY`], the value a failed
/// mutation carries in place of a real job.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct JobId(Uuid);

impl JobId {
    pub const EMPTY: JobId = JobId(Uuid::nil());

    pub fn new_v4() -> Self {
        JobId(Uuid::new_v4())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    pub fn parse(s: &str) -> Result<Self, JobIdError> {
        if s.is_empty() {
            return Ok(JobId::EMPTY);
        }
        Uuid::parse_str(s)
            .map(JobId)
            .map_err(|err| JobIdError::new(s, err))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({self})")
    }
}

impl FromStr for JobId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobId::parse(s)
    }
}

/// Identifier of a storage instance on the service.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new_v4() -> Self {
        InstanceId(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, JobIdError> {
        Uuid::parse_str(s)
            .map(InstanceId)
            .map_err(|err| JobIdError::new(s, err))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({self})")
    }
}

impl FromStr for InstanceId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceId::parse(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown job status code {0}")]
pub struct UnknownJobStatus(pub u8);

/// Progress of a job. `InProgress` may be reported more than once; the
/// last three states are terminal.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Failed,
    Canceled,
    Success,
}

impl JobStatus {
    pub const fn code(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::InProgress => 1,
            JobStatus::Failed => 2,
            JobStatus::Canceled => 3,
            JobStatus::Success => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = UnknownJobStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(JobStatus::Queued),
            1 => Ok(JobStatus::InProgress),
            2 => Ok(JobStatus::Failed),
            3 => Ok(JobStatus::Canceled),
            4 => Ok(JobStatus::Success),
            other => Err(UnknownJobStatus(other)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in progress",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Success => "success",
        };
        f.write_str(s)
    }
}

/// Snapshot of a job as pushed by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub instance_id: InstanceId,
    pub cid: ContentAddress,
    pub status: JobStatus,
    /// Set when `status` is `Failed`.
    pub failure_reason: Option<String>,
}
