//! Request modifiers.
//!
//! Each modifier sets one field of a request. Modifiers are applied in the
//! order given; if one of them is rejected no request is produced at all.

use strata_core::{CidConfig, ConfigError, ContentAddress, JobId};

use crate::error::Result;
use crate::rpc;

/// Modifiers for [`crate::Client::push_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOption {
    /// Replace the instance default with an explicit policy for the address.
    CidConfig(CidConfig),
    /// Authorize replacing an existing non-default policy.
    Override(bool),
}

impl PushOption {
    fn apply(self, target: &ContentAddress, req: &mut rpc::PushConfig) -> Result<()> {
        match self {
            PushOption::CidConfig(config) => {
                if config.cid != *target {
                    return Err(ConfigError::AddressMismatch {
                        expected: *target,
                        found: config.cid,
                    }
                    .into());
                }
                config.validate()?;
                req.config = Some((&config).into());
            }
            PushOption::Override(value) => req.override_config = value,
        }
        Ok(())
    }
}

/// Builds the push request for `cid`.
///
/// With no options the request carries no config and the service applies
/// the instance default.
pub fn build_push(
    token: &str,
    cid: &ContentAddress,
    options: impl IntoIterator<Item = PushOption>,
) -> Result<rpc::PushConfig> {
    let mut req = rpc::PushConfig {
        token: token.to_string(),
        cid: cid.to_string(),
        config: None,
        override_config: false,
    };
    for option in options {
        option.apply(cid, &mut req)?;
    }
    Ok(req)
}

/// Modifiers for [`crate::Client::new_addr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewAddrOption {
    /// Make the new address the funding address of the default config.
    MakeDefault(bool),
    /// Key type of the address, e.g. `bls` or `secp256k1`.
    AddressType(String),
}

pub fn build_new_addr(
    token: &str,
    name: &str,
    options: impl IntoIterator<Item = NewAddrOption>,
) -> rpc::NewAddr {
    let mut req = rpc::NewAddr {
        token: token.to_string(),
        name: name.to_string(),
        addr_type: String::new(),
        make_default: false,
    };
    for option in options {
        match option {
            NewAddrOption::MakeDefault(value) => req.make_default = value,
            NewAddrOption::AddressType(value) => req.addr_type = value,
        }
    }
    req
}

/// Modifiers for [`crate::Client::watch_logs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchLogsOption {
    /// Only messages produced by this job.
    JobFilter(JobId),
}

pub fn build_watch_logs(
    token: &str,
    cid: &ContentAddress,
    options: impl IntoIterator<Item = WatchLogsOption>,
) -> rpc::WatchLogs {
    let mut req = rpc::WatchLogs {
        token: token.to_string(),
        cid: cid.to_string(),
        jid: None,
    };
    for option in options {
        match option {
            WatchLogsOption::JobFilter(jid) => req.jid = Some(jid.to_string()),
        }
    }
    req
}
