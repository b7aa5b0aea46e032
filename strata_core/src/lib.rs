//! Value types for the strata storage client.
//!
//! Everything in this crate is plain data: identifiers that cross the wire
//! as strings, the job and log records pushed by the service, and the
//! hot/cold storage policy that callers construct and send.
//!
//! ## Wire-facing identifiers
//!
//! - Content hashes (`hash::Hash`, BLAKE3)
//! - Content addresses (`cid::ContentAddress`), the primary storage key
//! - Job and instance identifiers (`job::JobId`, `job::InstanceId`)
//!
//! All of them reject malformed input at parse time, so a value of one of
//! these types is always well formed.
//!
//! ## Records and policy
//!
//! - `job::Job` / `job::JobStatus`: asynchronous work tracked by the service
//! - `log::LogEntry`: human-readable execution messages
//! - `config`: `HotConfig`, `ColdConfig`, `DefaultConfig` and `CidConfig`
//! - `info`: read-only views returned by the inspection calls

pub mod cid;
pub mod config;
pub mod hash;
pub mod info;
pub mod job;
pub mod log;

pub use cid::{Codec, ContentAddress, ContentAddressError};
pub use config::{CidConfig, ColdConfig, ConfigError, DefaultConfig, HotConfig, RenewConfig};
pub use hash::Hash;
pub use info::{AddrInfo, BalanceInfo, CidInfo, ColdInfo, HotInfo, InstanceInfo};
pub use job::{InstanceId, Job, JobId, JobIdError, JobStatus, UnknownJobStatus};
pub use log::LogEntry;
