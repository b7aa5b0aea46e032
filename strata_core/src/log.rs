use std::time::SystemTime;

use crate::{ContentAddress, JobId};

/// A human-readable message about work executed for a content address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub cid: ContentAddress,
    pub timestamp: SystemTime,
    pub job_id: JobId,
    pub message: String,
}
