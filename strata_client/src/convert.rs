//! Conversions between wire messages and `strata_core` values.
//!
//! Encoding is infallible. Decoding validates every identifier so a
//! malformed service message never reaches the caller as a value.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use strata_core::{
    AddrInfo, BalanceInfo, CidConfig, CidInfo, ColdConfig, ColdInfo, ContentAddress,
    DefaultConfig, HotConfig, HotInfo, InstanceId, InstanceInfo, Job, JobId, JobStatus, LogEntry,
    RenewConfig,
};

use crate::error::DecodeError;
use crate::rpc;

impl From<&HotConfig> for rpc::HotConfig {
    fn from(config: &HotConfig) -> Self {
        Self {
            enabled: config.enabled,
            allow_unfreeze: config.allow_unfreeze,
            add_timeout: config.add_timeout_secs,
        }
    }
}

impl From<rpc::HotConfig> for HotConfig {
    fn from(config: rpc::HotConfig) -> Self {
        Self {
            enabled: config.enabled,
            allow_unfreeze: config.allow_unfreeze,
            add_timeout_secs: config.add_timeout,
        }
    }
}

impl From<&ColdConfig> for rpc::ColdConfig {
    fn from(config: &ColdConfig) -> Self {
        Self {
            enabled: config.enabled,
            rep_factor: config.rep_factor,
            deal_duration: config.deal_duration,
            excluded_miners: config.excluded_miners.clone(),
            trusted_miners: config.trusted_miners.clone(),
            country_codes: config.country_codes.clone(),
            renew: rpc::RenewConfig {
                enabled: config.renew.enabled,
                threshold: config.renew.threshold,
            },
            addr: config.addr.clone(),
        }
    }
}

impl From<rpc::ColdConfig> for ColdConfig {
    fn from(config: rpc::ColdConfig) -> Self {
        Self {
            enabled: config.enabled,
            rep_factor: config.rep_factor,
            deal_duration: config.deal_duration,
            excluded_miners: config.excluded_miners,
            trusted_miners: config.trusted_miners,
            country_codes: config.country_codes,
            renew: RenewConfig {
                enabled: config.renew.enabled,
                threshold: config.renew.threshold,
            },
            addr: config.addr,
        }
    }
}

impl From<&DefaultConfig> for rpc::DefaultConfig {
    fn from(config: &DefaultConfig) -> Self {
        Self {
            hot: (&config.hot).into(),
            cold: (&config.cold).into(),
        }
    }
}

impl From<rpc::DefaultConfig> for DefaultConfig {
    fn from(config: rpc::DefaultConfig) -> Self {
        Self {
            hot: config.hot.into(),
            cold: config.cold.into(),
        }
    }
}

impl From<&CidConfig> for rpc::CidConfig {
    fn from(config: &CidConfig) -> Self {
        Self {
            cid: config.cid.to_string(),
            hot: (&config.hot).into(),
            cold: (&config.cold).into(),
        }
    }
}

impl TryFrom<rpc::CidConfig> for CidConfig {
    type Error = DecodeError;

    fn try_from(config: rpc::CidConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            cid: ContentAddress::parse(&config.cid)?,
            hot: config.hot.into(),
            cold: config.cold.into(),
        })
    }
}

impl From<&Job> for rpc::Job {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            instance_id: job.instance_id.to_string(),
            cid: job.cid.to_string(),
            status: job.status.code(),
            err_cause: job.failure_reason.clone().unwrap_or_default(),
        }
    }
}

impl TryFrom<rpc::Job> for Job {
    type Error = DecodeError;

    fn try_from(job: rpc::Job) -> Result<Self, Self::Error> {
        Ok(Self {
            id: decode_job_id(&job.id)?,
            instance_id: InstanceId::parse(&job.instance_id)?,
            cid: ContentAddress::parse(&job.cid)?,
            status: JobStatus::try_from(job.status)?,
            failure_reason: (!job.err_cause.is_empty()).then_some(job.err_cause),
        })
    }
}

impl From<&LogEntry> for rpc::LogEntry {
    fn from(entry: &LogEntry) -> Self {
        let time = entry
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        Self {
            cid: entry.cid.to_string(),
            time,
            jid: entry.job_id.to_string(),
            msg: entry.message.clone(),
        }
    }
}

impl TryFrom<rpc::LogEntry> for LogEntry {
    type Error = DecodeError;

    fn try_from(entry: rpc::LogEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            cid: ContentAddress::parse(&entry.cid)?,
            timestamp: decode_time(entry.time)?,
            // Log lines that do not belong to a job carry the empty id.
            job_id: JobId::parse(&entry.jid)?,
            message: entry.msg,
        })
    }
}

impl From<rpc::AddrInfo> for AddrInfo {
    fn from(info: rpc::AddrInfo) -> Self {
        Self {
            name: info.name,
            addr: info.addr,
            addr_type: info.addr_type,
        }
    }
}

impl TryFrom<rpc::CidInfo> for CidInfo {
    type Error = DecodeError;

    fn try_from(info: rpc::CidInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            cid: ContentAddress::parse(&info.cid)?,
            created: decode_time(info.created)?,
            hot: HotInfo {
                enabled: info.hot_enabled,
                size: info.hot_size,
            },
            cold: ColdInfo {
                enabled: info.cold_enabled,
            },
        })
    }
}

impl TryFrom<rpc::InstanceInfo> for InstanceInfo {
    type Error = DecodeError;

    fn try_from(info: rpc::InstanceInfo) -> Result<Self, Self::Error> {
        let pins = info
            .pins
            .iter()
            .map(|cid| ContentAddress::parse(cid))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: InstanceId::parse(&info.id)?,
            default_config: info.default_config.into(),
            balances: info
                .balances
                .into_iter()
                .map(|b| BalanceInfo {
                    addr: b.addr.into(),
                    balance: b.balance,
                })
                .collect(),
            pins,
        })
    }
}

/// Job id handed back by a successful mutation; the empty id is rejected.
pub(crate) fn decode_job_id(s: &str) -> Result<JobId, DecodeError> {
    let id = JobId::parse(s)?;
    if id.is_empty() {
        return Err(DecodeError::EmptyJobId);
    }
    Ok(id)
}

pub(crate) fn decode_time(secs: i64) -> Result<SystemTime, DecodeError> {
    let secs_u64 = u64::try_from(secs).map_err(|_| DecodeError::Timestamp(secs))?;
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs_u64))
        .ok_or(DecodeError::Timestamp(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_job() -> rpc::Job {
        rpc::Job {
            id: JobId::new_v4().to_string(),
            instance_id: InstanceId::new_v4().to_string(),
            cid: ContentAddress::for_bytes(b"job").to_string(),
            status: JobStatus::InProgress.code(),
            err_cause: String::new(),
        }
    }

    #[test]
    fn decodes_a_well_formed_job() {
        let wire = wire_job();
        let job = Job::try_from(wire.clone()).unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.failure_reason, None);
        assert_eq!(rpc::Job::from(&job), wire);
    }

    #[test]
    fn failure_reason_survives() {
        let wire = rpc::Job {
            status: JobStatus::Failed.code(),
            err_cause: "no miners".to_string(),
            ..wire_job()
        };
        let job = Job::try_from(wire).unwrap();
        assert_eq!(job.failure_reason.as_deref(), Some("no miners"));
    }

    #[test]
    fn rejects_malformed_fields() {
        let bad_cid = rpc::Job {
            cid: "bogus".to_string(),
            ..wire_job()
        };
        assert!(matches!(
            Job::try_from(bad_cid),
            Err(DecodeError::ContentAddress(_))
        ));

        let bad_id = rpc::Job {
            id: "42".to_string(),
            ..wire_job()
        };
        assert!(matches!(
            Job::try_from(bad_id),
            Err(DecodeError::Identifier(_))
        ));

        let empty_id = rpc::Job {
            id: String::new(),
            ..wire_job()
        };
        assert_eq!(Job::try_from(empty_id), Err(DecodeError::EmptyJobId));

        let bad_status = rpc::Job {
            status: 200,
            ..wire_job()
        };
        assert!(matches!(
            Job::try_from(bad_status),
            Err(DecodeError::JobStatus(_))
        ));
    }

    #[test]
    fn log_entries_keep_second_precision() {
        let wire = rpc::LogEntry {
            cid: ContentAddress::for_bytes(b"log").to_string(),
            time: 1_700_000_000,
            jid: String::new(),
            msg: "hello".to_string(),
        };
        let entry = LogEntry::try_from(wire.clone()).unwrap();
        assert!(entry.job_id.is_empty());
        assert_eq!(rpc::LogEntry::from(&entry), wire);

        let negative = rpc::LogEntry { time: -1, ..wire };
        assert_eq!(
            LogEntry::try_from(negative),
            Err(DecodeError::Timestamp(-1))
        );
    }

    #[test]
    fn configs_roundtrip_through_the_wire_shape() {
        let mut config = DefaultConfig::default().for_cid(ContentAddress::for_bytes(b"cfg"));
        config.cold.enabled = true;
        config.cold.addr = "f1abc".to_string();
        config.cold.country_codes = vec!["CA".to_string()];
        let wire = rpc::CidConfig::from(&config);
        assert_eq!(CidConfig::try_from(wire).unwrap(), config);
    }
}
