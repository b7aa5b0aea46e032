//! Hot/cold storage policy.
//!
//! A [`DefaultConfig`] applies instance-wide. A [`CidConfig`] is the same
//! policy bound to one content address; pushing one that differs from the
//! default is an override and needs explicit authorization to be replaced.

use serde::{Deserialize, Serialize};

use crate::ContentAddress;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("replication factor must be at least 1 when cold storage is enabled")]
    ReplicationFactor,
    #[error("deal duration must be greater than zero when cold storage is enabled")]
    DealDuration,
    #[error("a funding address is required when cold storage is enabled")]
    MissingFundingAddress,
    #[error("renew threshold must be greater than zero when renewal is enabled")]
    RenewThreshold,
    #[error("config is for {found}, expected {expected}")]
    AddressMismatch {
        expected: ContentAddress,
        found: ContentAddress,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct HotConfig {
    pub enabled: bool,
    /// Allow fetching the data back from cold storage if it is missing hot.
    pub allow_unfreeze: bool,
    /// Upload timeout enforced by the service, in seconds.
    pub add_timeout_secs: u64,
}

impl Default for HotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_unfreeze: false,
            add_timeout_secs: 30,
        }
    }
}

impl HotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct RenewConfig {
    pub enabled: bool,
    /// Remaining epochs at which a deal is renewed.
    pub threshold: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct ColdConfig {
    pub enabled: bool,
    pub rep_factor: u32,
    /// Deal duration in epochs.
    pub deal_duration: u64,
    pub excluded_miners: Vec<String>,
    pub trusted_miners: Vec<String>,
    pub country_codes: Vec<String>,
    pub renew: RenewConfig,
    /// Wallet address that pays for deals.
    pub addr: String,
}

impl Default for ColdConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rep_factor: 1,
            deal_duration: 1000,
            excluded_miners: Vec::new(),
            trusted_miners: Vec::new(),
            country_codes: Vec::new(),
            renew: RenewConfig::default(),
            addr: String::new(),
        }
    }
}

impl ColdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.rep_factor == 0 {
            return Err(ConfigError::ReplicationFactor);
        }
        if self.deal_duration == 0 {
            return Err(ConfigError::DealDuration);
        }
        if self.addr.is_empty() {
            return Err(ConfigError::MissingFundingAddress);
        }
        if self.renew.enabled && self.renew.threshold == 0 {
            return Err(ConfigError::RenewThreshold);
        }
        Ok(())
    }
}

/// Policy applied to every address without an explicit config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct DefaultConfig {
    pub hot: HotConfig,
    pub cold: ColdConfig,
}

impl DefaultConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hot.validate()?;
        self.cold.validate()
    }

    /// The default policy bound to `cid`.
    pub fn for_cid(&self, cid: ContentAddress) -> CidConfig {
        CidConfig {
            cid,
            hot: self.hot.clone(),
            cold: self.cold.clone(),
        }
    }
}

/// Policy for a single content address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CidConfig {
    pub cid: ContentAddress,
    #[serde(default)]
    pub hot: HotConfig,
    #[serde(default)]
    pub cold: ColdConfig,
}

impl CidConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hot.validate()?;
        self.cold.validate()
    }

    /// Whether this config only restates `default`.
    pub fn matches_default(&self, default: &DefaultConfig) -> bool {
        self.hot == default.hot && self.cold == default.cold
    }

    /// Whether any storage tier is still enabled.
    pub fn is_active(&self) -> bool {
        self.hot.enabled || self.cold.enabled
    }
}
