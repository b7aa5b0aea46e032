//! Wire protocol spoken with the storage service.
//!
//! Identifiers travel as strings and are validated by the client when a
//! reply is decoded (see [`crate::convert`]). Instance-scoped requests carry
//! the auth token returned by [`Create`].

use bytes::Bytes;
use irpc::channel::{mpsc, oneshot};
use irpc::rpc_requests;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// The ALPN string for this protocol
pub const ALPN: &[u8] = b"strata/ffs/0";

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Serialize, Deserialize)]
#[rpc_requests(message = FfsMessage)]
pub enum RpcProto {
    #[rpc(tx = oneshot::Sender<ServiceResult<CreateResponse>>)]
    Create(Create),
    #[rpc(tx = oneshot::Sender<ServiceResult<String>>)]
    InstanceId(InstanceIdRequest),
    #[rpc(tx = oneshot::Sender<ServiceResult<Vec<AddrInfo>>>)]
    Addrs(Addrs),
    #[rpc(tx = oneshot::Sender<ServiceResult<DefaultConfig>>)]
    GetDefaultConfig(GetDefaultConfig),
    #[rpc(tx = oneshot::Sender<ServiceResult<()>>)]
    SetDefaultConfig(SetDefaultConfig),
    #[rpc(tx = oneshot::Sender<ServiceResult<String>>)]
    NewAddr(NewAddr),
    #[rpc(tx = oneshot::Sender<ServiceResult<CidConfig>>)]
    GetDefaultCidConfig(GetDefaultCidConfig),
    #[rpc(tx = oneshot::Sender<ServiceResult<CidConfig>>)]
    GetCidConfig(GetCidConfig),
    #[rpc(tx = oneshot::Sender<ServiceResult<CidInfo>>)]
    Show(Show),
    #[rpc(tx = oneshot::Sender<ServiceResult<InstanceInfo>>)]
    Info(Info),
    /// Moves the config of `cid1` to `cid2`; replies with the job id.
    #[rpc(tx = oneshot::Sender<ServiceResult<String>>)]
    Replace(Replace),
    /// Replies with the job id.
    #[rpc(tx = oneshot::Sender<ServiceResult<String>>)]
    PushConfig(PushConfig),
    #[rpc(tx = oneshot::Sender<ServiceResult<()>>)]
    Remove(Remove),
    /// Replies once the transfer is queued, not once funds have moved.
    #[rpc(tx = oneshot::Sender<ServiceResult<()>>)]
    SendFil(SendFil),
    #[rpc(tx = oneshot::Sender<ServiceResult<()>>)]
    Close(Close),
    // Server pushes job updates until every watched job is terminal
    // or the client goes away.
    #[rpc(tx = mpsc::Sender<ServiceResult<Job>>)]
    WatchJobs(WatchJobs),
    #[rpc(tx = mpsc::Sender<ServiceResult<LogEntry>>)]
    WatchLogs(WatchLogs),
    // Client streams chunks; server replies with the content address.
    #[rpc(tx = oneshot::Sender<ServiceResult<String>>, rx = mpsc::Receiver<Bytes>)]
    AddToHot(AddToHot),
    #[rpc(tx = mpsc::Sender<ServiceResult<Bytes>>)]
    Get(Get),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Create {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstanceIdRequest {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Addrs {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetDefaultConfig {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetDefaultConfig {
    pub token: String,
    pub config: DefaultConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAddr {
    pub token: String,
    pub name: String,
    /// Empty means the service default.
    pub addr_type: String,
    pub make_default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetDefaultCidConfig {
    pub token: String,
    pub cid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetCidConfig {
    pub token: String,
    pub cid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Show {
    pub token: String,
    pub cid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Info {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Replace {
    pub token: String,
    pub cid1: String,
    pub cid2: String,
}

/// Push request produced by [`crate::options::build_push`].
///
/// `config: None` asks for the instance default; `override_config` is
/// carried separately so the service can tell "no config", "config" and
/// "config with override" apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushConfig {
    pub token: String,
    pub cid: String,
    pub config: Option<CidConfig>,
    pub override_config: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Remove {
    pub token: String,
    pub cid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendFil {
    pub token: String,
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Close {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WatchJobs {
    pub token: String,
    /// Empty watches every job of the instance.
    pub jids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchLogs {
    pub token: String,
    pub cid: String,
    pub jid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddToHot {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Get {
    pub token: String,
    pub cid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotConfig {
    pub enabled: bool,
    pub allow_unfreeze: bool,
    pub add_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenewConfig {
    pub enabled: bool,
    pub threshold: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColdConfig {
    pub enabled: bool,
    pub rep_factor: u32,
    pub deal_duration: u64,
    pub excluded_miners: Vec<String>,
    pub trusted_miners: Vec<String>,
    pub country_codes: Vec<String>,
    pub renew: RenewConfig,
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultConfig {
    pub hot: HotConfig,
    pub cold: ColdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CidConfig {
    pub cid: String,
    pub hot: HotConfig,
    pub cold: ColdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub instance_id: String,
    pub cid: String,
    pub status: u8,
    /// Empty unless the job failed.
    pub err_cause: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub cid: String,
    /// Unix seconds.
    pub time: i64,
    pub jid: String,
    pub msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddrInfo {
    pub name: String,
    pub addr: String,
    pub addr_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceInfo {
    pub addr: AddrInfo,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CidInfo {
    pub cid: String,
    /// Unix seconds.
    pub created: i64,
    pub hot_enabled: bool,
    pub hot_size: u64,
    pub cold_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceInfo {
    pub id: String,
    pub default_config: DefaultConfig,
    pub balances: Vec<BalanceInfo>,
    pub pins: Vec<String>,
}
