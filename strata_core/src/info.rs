//! Read-only views returned by the inspection calls.

use std::time::SystemTime;

use crate::{ContentAddress, DefaultConfig, InstanceId};

/// A wallet address managed by an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrInfo {
    pub name: String,
    pub addr: String,
    pub addr_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceInfo {
    pub addr: AddrInfo,
    pub balance: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotInfo {
    pub enabled: bool,
    /// Bytes held in hot storage, zero when nothing has been added yet.
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColdInfo {
    pub enabled: bool,
}

/// Storage state of one tracked address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CidInfo {
    pub cid: ContentAddress,
    pub created: SystemTime,
    pub hot: HotInfo,
    pub cold: ColdInfo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceInfo {
    pub id: InstanceId,
    pub default_config: DefaultConfig,
    pub balances: Vec<BalanceInfo>,
    /// Addresses with a stored config.
    pub pins: Vec<ContentAddress>,
}
