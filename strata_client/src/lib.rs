//! Client for the strata hot/cold storage service.
//!
//! - [`Client`]: one-shot calls plus the streaming operations
//!   ([`Client::watch_jobs`], [`Client::watch_logs`], [`Client::add_to_hot`],
//!   [`Client::get`]).
//! - [`options`]: ordered request modifiers, including the push overlay
//!   ([`PushOption`]).
//! - [`watch`]: the adapter that turns server pushes into [`Events`].
//!
//! The wire format is defined by [`rpc::RpcProto`] and the ALPN identifier
//! is [`ALPN`].

pub mod rpc;
pub use crate::rpc::ALPN;

mod client;
pub use client::Client;

mod config;
pub use config::ClientConfig;

mod convert;
mod download;

mod error;
pub use error::{DecodeError, Error, Result, ServiceError};

pub mod options;
pub use options::{NewAddrOption, PushOption, WatchLogsOption};

mod upload;
pub use upload::CHUNK_SIZE;

pub mod watch;
pub use watch::Events;

#[cfg(feature = "testutil")]
pub mod testutil;

pub use tokio_util::sync::CancellationToken;
