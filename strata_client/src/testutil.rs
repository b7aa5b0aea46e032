//! In-process storage service for tests.
//!
//! [`MemoryService`] answers every request of [`crate::rpc::RpcProto`] from
//! memory. It does not make deals; jobs stay `Queued` until the test drives
//! them with [`MemoryService::set_job_status`] or [`MemoryService::fail_job`].
//!
//! ```toml
//! [dev-dependencies]
//! strata_client = { workspace = true, features = ["testutil"] }
//! ```
//!
//! The same service can be served over iroh by registering it with a
//! router under [`crate::ALPN`].
//!
//! ```ignore
//! let service = MemoryService::spawn();
//! let client = service.instance().await?;
//! let jid = client.push_config(&cid, []).await?;
//! service.set_job_status(&jid, JobStatus::Success);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use iroh::endpoint::Connection;
use iroh::protocol::{AcceptError, ProtocolHandler};
use irpc::WithChannels;
use irpc::channel::{mpsc as irpc_mpsc, oneshot};
use irpc_iroh::read_request;
use strata_core::{
    CidConfig, ColdConfig, ContentAddress, DefaultConfig, InstanceId, Job, JobId, JobStatus,
};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::Client;
use crate::error::ServiceError;
use crate::rpc::{self, FfsMessage, RpcProto, ServiceResult};

const INITIAL_BALANCE: u64 = 1_000_000;
const DOWNLOAD_CHUNK: usize = 16 * 1024;

struct Instance {
    id: InstanceId,
    default_config: DefaultConfig,
    addrs: Vec<(rpc::AddrInfo, u64)>,
    configs: HashMap<ContentAddress, CidConfig>,
    created: HashMap<ContentAddress, SystemTime>,
}

struct JobRecord {
    job: Job,
    token: String,
    /// Updates after the job was queued, replayed to id-filtered watches.
    transitions: Vec<rpc::Job>,
}

#[derive(Default)]
struct State {
    instances: HashMap<String, Instance>,
    jobs: HashMap<JobId, JobRecord>,
    blobs: HashMap<ContentAddress, Bytes>,
    logs: Vec<(String, rpc::LogEntry)>,
    max_upload: Option<usize>,
    upload_frames: Vec<usize>,
}

impl State {
    fn instance(&self, token: &str) -> ServiceResult<&Instance> {
        self.instances.get(token).ok_or(ServiceError::Unauthorized)
    }

    fn instance_mut(&mut self, token: &str) -> ServiceResult<&mut Instance> {
        self.instances.get_mut(token).ok_or(ServiceError::Unauthorized)
    }
}

/// Broadcast updates are tagged with the owning token; `None` reaches
/// every instance.
type Tagged<T> = (Option<String>, T);

struct Shared {
    state: Mutex<State>,
    jobs: broadcast::Sender<Tagged<rpc::Job>>,
    logs: broadcast::Sender<Tagged<rpc::LogEntry>>,
    shutdown: Mutex<CancellationToken>,
}

fn invalid(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidArgument(err.to_string())
}

fn parse_cid(s: &str) -> ServiceResult<ContentAddress> {
    ContentAddress::parse(s).map_err(invalid)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn is_terminal(code: u8) -> bool {
    JobStatus::try_from(code).is_ok_and(JobStatus::is_terminal)
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn shutdown_token(&self) -> CancellationToken {
        self.shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn log(&self, state: &mut State, token: &str, cid: ContentAddress, jid: JobId, msg: String) {
        let entry = rpc::LogEntry {
            cid: cid.to_string(),
            time: unix_now(),
            jid: jid.to_string(),
            msg,
        };
        state.logs.push((token.to_string(), entry.clone()));
        let _ = self.logs.send((Some(token.to_string()), entry));
    }

    fn queue_job(
        &self,
        state: &mut State,
        token: &str,
        instance_id: InstanceId,
        cid: ContentAddress,
        what: &str,
    ) -> JobId {
        let job = Job {
            id: JobId::new_v4(),
            instance_id,
            cid,
            status: JobStatus::Queued,
            failure_reason: None,
        };
        let jid = job.id;
        let _ = self
            .jobs
            .send((Some(token.to_string()), rpc::Job::from(&job)));
        state.jobs.insert(
            jid,
            JobRecord {
                job,
                token: token.to_string(),
                transitions: Vec::new(),
            },
        );
        self.log(state, token, cid, jid, format!("{what}, job queued"));
        jid
    }

    fn transition(&self, jid: &JobId, status: JobStatus, reason: Option<String>) -> bool {
        let mut state = self.lock();
        let Some(record) = state.jobs.get_mut(jid) else {
            return false;
        };
        record.job.status = status;
        record.job.failure_reason = reason;
        let wire = rpc::Job::from(&record.job);
        record.transitions.push(wire.clone());
        let token = record.token.clone();
        let cid = record.job.cid;
        let _ = self.jobs.send((Some(token.clone()), wire));
        self.log(&mut state, &token, cid, *jid, format!("job {status}"));
        true
    }

    fn create(&self) -> rpc::CreateResponse {
        let id = InstanceId::new_v4();
        let token = Uuid::new_v4().to_string();
        let initial = rpc::AddrInfo {
            name: "Initial Address".to_string(),
            addr: format!("f1{}", Uuid::new_v4().simple()),
            addr_type: "bls".to_string(),
        };
        let default_config = DefaultConfig {
            cold: ColdConfig {
                addr: initial.addr.clone(),
                ..ColdConfig::default()
            },
            ..DefaultConfig::default()
        };
        self.lock().instances.insert(
            token.clone(),
            Instance {
                id,
                default_config,
                addrs: vec![(initial, INITIAL_BALANCE)],
                configs: HashMap::new(),
                created: HashMap::new(),
            },
        );
        debug!("memory service: created instance {id}");
        rpc::CreateResponse {
            id: id.to_string(),
            token,
        }
    }

    fn set_default_config(&self, req: rpc::SetDefaultConfig) -> ServiceResult<()> {
        let config = DefaultConfig::from(req.config);
        config.validate().map_err(invalid)?;
        self.lock().instance_mut(&req.token)?.default_config = config;
        Ok(())
    }

    fn new_addr(&self, req: rpc::NewAddr) -> ServiceResult<String> {
        if req.name.is_empty() {
            return Err(invalid("address name is empty"));
        }
        let mut state = self.lock();
        let instance = state.instance_mut(&req.token)?;
        let addr = format!("f1{}", Uuid::new_v4().simple());
        let addr_type = if req.addr_type.is_empty() {
            "bls".to_string()
        } else {
            req.addr_type
        };
        instance.addrs.push((
            rpc::AddrInfo {
                name: req.name,
                addr: addr.clone(),
                addr_type,
            },
            0,
        ));
        if req.make_default {
            instance.default_config.cold.addr = addr.clone();
        }
        Ok(addr)
    }

    fn get_cid_config(&self, token: &str, cid: &str) -> ServiceResult<rpc::CidConfig> {
        let parsed = parse_cid(cid)?;
        let state = self.lock();
        state
            .instance(token)?
            .configs
            .get(&parsed)
            .map(rpc::CidConfig::from)
            .ok_or_else(|| ServiceError::NotFound(cid.to_string()))
    }

    fn show(&self, req: rpc::Show) -> ServiceResult<rpc::CidInfo> {
        let cid = parse_cid(&req.cid)?;
        let state = self.lock();
        let instance = state.instance(&req.token)?;
        let config = instance
            .configs
            .get(&cid)
            .ok_or_else(|| ServiceError::NotFound(req.cid.clone()))?;
        let created = instance
            .created
            .get(&cid)
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let hot_size = match state.blobs.get(&cid) {
            Some(data) if config.hot.enabled => data.len() as u64,
            _ => 0,
        };
        Ok(rpc::CidInfo {
            cid: req.cid,
            created,
            hot_enabled: config.hot.enabled,
            hot_size,
            cold_enabled: config.cold.enabled,
        })
    }

    fn info(&self, token: &str) -> ServiceResult<rpc::InstanceInfo> {
        let state = self.lock();
        let instance = state.instance(token)?;
        let mut pins: Vec<ContentAddress> = instance.configs.keys().copied().collect();
        pins.sort();
        Ok(rpc::InstanceInfo {
            id: instance.id.to_string(),
            default_config: (&instance.default_config).into(),
            balances: instance
                .addrs
                .iter()
                .map(|(addr, balance)| rpc::BalanceInfo {
                    addr: addr.clone(),
                    balance: *balance,
                })
                .collect(),
            pins: pins.iter().map(ToString::to_string).collect(),
        })
    }

    fn push(&self, req: rpc::PushConfig) -> ServiceResult<String> {
        let cid = parse_cid(&req.cid)?;
        let mut state = self.lock();
        let instance = state.instance_mut(&req.token)?;
        let incoming = match req.config {
            Some(config) => CidConfig::try_from(config).map_err(invalid)?,
            None => instance.default_config.for_cid(cid),
        };
        if incoming.cid != cid {
            return Err(invalid("config address does not match the pushed address"));
        }
        incoming.validate().map_err(invalid)?;
        if let Some(existing) = instance.configs.get(&cid) {
            if !existing.matches_default(&instance.default_config) && !req.override_config {
                return Err(ServiceError::PolicyConflict { cid: req.cid });
            }
        }
        instance.configs.insert(cid, incoming);
        instance.created.entry(cid).or_insert_with(SystemTime::now);
        let instance_id = instance.id;
        let jid = self.queue_job(&mut state, &req.token, instance_id, cid, "config pushed");
        Ok(jid.to_string())
    }

    fn replace(&self, req: rpc::Replace) -> ServiceResult<String> {
        let from = parse_cid(&req.cid1)?;
        let to = parse_cid(&req.cid2)?;
        let mut state = self.lock();
        let instance = state.instance_mut(&req.token)?;
        let mut config = instance
            .configs
            .get(&from)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(req.cid1.clone()))?;
        config.cid = to;
        instance.configs.remove(&from);
        instance.created.remove(&from);
        instance.configs.insert(to, config);
        instance.created.insert(to, SystemTime::now());
        let instance_id = instance.id;
        let what = format!("replaced {from}");
        let jid = self.queue_job(&mut state, &req.token, instance_id, to, &what);
        Ok(jid.to_string())
    }

    fn remove(&self, req: rpc::Remove) -> ServiceResult<()> {
        let cid = parse_cid(&req.cid)?;
        let mut state = self.lock();
        let instance = state.instance_mut(&req.token)?;
        let config = instance
            .configs
            .get(&cid)
            .ok_or_else(|| ServiceError::NotFound(req.cid.clone()))?;
        if config.is_active() {
            return Err(ServiceError::ActiveInStorage { cid: req.cid });
        }
        instance.configs.remove(&cid);
        instance.created.remove(&cid);
        Ok(())
    }

    fn send_fil(&self, req: rpc::SendFil) -> ServiceResult<()> {
        let mut state = self.lock();
        let instance = state.instance_mut(&req.token)?;
        let (_, balance) = instance
            .addrs
            .iter_mut()
            .find(|(info, _)| info.addr == req.from)
            .ok_or_else(|| ServiceError::NotFound(req.from.clone()))?;
        if *balance < req.amount {
            return Err(invalid(format!("insufficient funds in {}", req.from)));
        }
        *balance -= req.amount;
        if let Some((_, balance)) = instance
            .addrs
            .iter_mut()
            .find(|(info, _)| info.addr == req.to)
        {
            *balance += req.amount;
        }
        Ok(())
    }

    fn close(&self, token: &str) -> ServiceResult<()> {
        self.lock()
            .instances
            .remove(token)
            .map(|_| ())
            .ok_or(ServiceError::Unauthorized)
    }

    fn watch_jobs(&self, req: rpc::WatchJobs, tx: irpc_mpsc::Sender<ServiceResult<rpc::Job>>) {
        let opened = {
            let state = self.lock();
            state.instance(&req.token).map(|_| {
                let replay: Vec<rpc::Job> = req
                    .jids
                    .iter()
                    .filter_map(|jid| JobId::parse(jid).ok())
                    .filter_map(|jid| state.jobs.get(&jid))
                    .filter(|record| record.token == req.token)
                    .flat_map(|record| record.transitions.iter().cloned())
                    .collect();
                (replay, self.jobs.subscribe())
            })
        };
        let shutdown = self.shutdown_token();
        let filter: HashSet<String> = req.jids.into_iter().collect();
        let token = req.token;
        tokio::spawn(async move {
            let (replay, mut updates) = match opened {
                Ok(opened) => opened,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            };
            let mut pending = filter.clone();
            for job in replay {
                if is_terminal(job.status) {
                    pending.remove(&job.id);
                }
                if tx.send(Ok(job)).await.is_err() {
                    return;
                }
            }
            loop {
                if !filter.is_empty() && pending.is_empty() {
                    debug!("memory service: all watched jobs finished");
                    return;
                }
                let (owner, job) = tokio::select! {
                    _ = shutdown.cancelled() => return,
                    update = updates.recv() => match update {
                        Ok(update) => update,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            let lagged = ServiceError::Internal(format!("job watch lagged by {n} updates"));
                            let _ = tx.send(Err(lagged)).await;
                            return;
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                };
                if owner.is_some_and(|owner| owner != token) {
                    continue;
                }
                if !filter.is_empty() && !filter.contains(&job.id) {
                    continue;
                }
                if is_terminal(job.status) {
                    pending.remove(&job.id);
                }
                if tx.send(Ok(job)).await.is_err() {
                    return;
                }
            }
        });
    }

    fn watch_logs(&self, req: rpc::WatchLogs, tx: irpc_mpsc::Sender<ServiceResult<rpc::LogEntry>>) {
        let matches = {
            let cid = req.cid.clone();
            let jid = req.jid.clone();
            move |entry: &rpc::LogEntry| {
                entry.cid == cid && jid.as_ref().is_none_or(|jid| entry.jid == *jid)
            }
        };
        let opened = parse_cid(&req.cid).and_then(|_| {
            let state = self.lock();
            state.instance(&req.token)?;
            let replay: Vec<rpc::LogEntry> = state
                .logs
                .iter()
                .filter(|(owner, entry)| *owner == req.token && matches(entry))
                .map(|(_, entry)| entry.clone())
                .collect();
            Ok((replay, self.logs.subscribe()))
        });
        let shutdown = self.shutdown_token();
        let token = req.token;
        tokio::spawn(async move {
            let (replay, mut updates) = match opened {
                Ok(opened) => opened,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            };
            for entry in replay {
                if tx.send(Ok(entry)).await.is_err() {
                    return;
                }
            }
            loop {
                let (owner, entry) = tokio::select! {
                    _ = shutdown.cancelled() => return,
                    update = updates.recv() => match update {
                        Ok(update) => update,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            let lagged = ServiceError::Internal(format!("log watch lagged by {n} entries"));
                            let _ = tx.send(Err(lagged)).await;
                            return;
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                };
                if owner.is_some_and(|owner| owner != token) || !matches(&entry) {
                    continue;
                }
                if tx.send(Ok(entry)).await.is_err() {
                    return;
                }
            }
        });
    }

    async fn receive_upload(
        &self,
        token: &str,
        rx: &mut irpc_mpsc::Receiver<Bytes>,
    ) -> ServiceResult<String> {
        let (known, limit) = {
            let state = self.lock();
            (state.instances.contains_key(token), state.max_upload)
        };
        if !known {
            return Err(ServiceError::Unauthorized);
        }
        let mut data = BytesMut::new();
        let mut frames = Vec::new();
        loop {
            match rx.recv().await {
                Ok(Some(chunk)) => {
                    frames.push(chunk.len());
                    data.extend_from_slice(&chunk);
                    if let Some(limit) = limit.filter(|limit| data.len() > *limit) {
                        self.lock().upload_frames = frames;
                        return Err(invalid(format!("upload exceeds {limit} bytes")));
                    }
                }
                Ok(None) => break,
                Err(err) => return Err(ServiceError::Internal(err.to_string())),
            }
        }
        let data = data.freeze();
        let cid = ContentAddress::for_bytes(&data);
        let mut state = self.lock();
        state.upload_frames = frames;
        state.blobs.insert(cid, data);
        Ok(cid.to_string())
    }

    fn get(&self, req: rpc::Get, tx: irpc_mpsc::Sender<ServiceResult<Bytes>>) {
        let blob = parse_cid(&req.cid).and_then(|cid| {
            let state = self.lock();
            state.instance(&req.token)?;
            state
                .blobs
                .get(&cid)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(req.cid.clone()))
        });
        tokio::spawn(async move {
            let data = match blob {
                Ok(data) => data,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            };
            let mut offset = 0;
            while offset < data.len() {
                let end = (offset + DOWNLOAD_CHUNK).min(data.len());
                if tx.send(Ok(data.slice(offset..end))).await.is_err() {
                    return;
                }
                offset = end;
            }
        });
    }
}

struct Actor {
    shared: Arc<Shared>,
    recv: mpsc::Receiver<FfsMessage>,
}

impl Actor {
    async fn run(mut self) {
        while let Some(msg) = self.recv.recv().await {
            self.handle(msg).await;
        }
        debug!("memory service: all clients gone");
    }

    async fn handle(&self, msg: FfsMessage) {
        let shared = &self.shared;
        match msg {
            FfsMessage::Create(WithChannels { tx, .. }) => {
                let _ = tx.send(Ok(shared.create())).await;
            }
            FfsMessage::InstanceId(WithChannels { inner, tx, .. }) => {
                let res = shared
                    .lock()
                    .instance(&inner.token)
                    .map(|instance| instance.id.to_string());
                let _ = tx.send(res).await;
            }
            FfsMessage::Addrs(WithChannels { inner, tx, .. }) => {
                let res = shared.lock().instance(&inner.token).map(|instance| {
                    instance.addrs.iter().map(|(addr, _)| addr.clone()).collect()
                });
                let _ = tx.send(res).await;
            }
            FfsMessage::GetDefaultConfig(WithChannels { inner, tx, .. }) => {
                let res = shared
                    .lock()
                    .instance(&inner.token)
                    .map(|instance| (&instance.default_config).into());
                let _ = tx.send(res).await;
            }
            FfsMessage::SetDefaultConfig(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.set_default_config(inner)).await;
            }
            FfsMessage::NewAddr(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.new_addr(inner)).await;
            }
            FfsMessage::GetDefaultCidConfig(WithChannels { inner, tx, .. }) => {
                let res = parse_cid(&inner.cid).and_then(|cid| {
                    let state = shared.lock();
                    let instance = state.instance(&inner.token)?;
                    Ok(rpc::CidConfig::from(&instance.default_config.for_cid(cid)))
                });
                let _ = tx.send(res).await;
            }
            FfsMessage::GetCidConfig(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.get_cid_config(&inner.token, &inner.cid)).await;
            }
            FfsMessage::Show(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.show(inner)).await;
            }
            FfsMessage::Info(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.info(&inner.token)).await;
            }
            FfsMessage::Replace(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.replace(inner)).await;
            }
            FfsMessage::PushConfig(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.push(inner)).await;
            }
            FfsMessage::Remove(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.remove(inner)).await;
            }
            FfsMessage::SendFil(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.send_fil(inner)).await;
            }
            FfsMessage::Close(WithChannels { inner, tx, .. }) => {
                let _ = tx.send(shared.close(&inner.token)).await;
            }
            FfsMessage::WatchJobs(WithChannels { inner, tx, .. }) => {
                shared.watch_jobs(inner, tx);
            }
            FfsMessage::WatchLogs(WithChannels { inner, tx, .. }) => {
                shared.watch_logs(inner, tx);
            }
            FfsMessage::AddToHot(WithChannels { inner, tx, rx, .. }) => {
                let shared = shared.clone();
                tokio::spawn(upload_task(shared, inner, tx, rx));
            }
            FfsMessage::Get(WithChannels { inner, tx, .. }) => {
                shared.get(inner, tx);
            }
        }
    }
}

async fn upload_task(
    shared: Arc<Shared>,
    req: rpc::AddToHot,
    tx: oneshot::Sender<ServiceResult<String>>,
    mut rx: irpc_mpsc::Receiver<Bytes>,
) {
    let result = shared.receive_upload(&req.token, &mut rx).await;
    // Refuse further frames before answering.
    drop(rx);
    let _ = tx.send(result).await;
}

/// Handle to an in-process service; clones share the same state.
#[derive(Clone)]
pub struct MemoryService {
    shared: Arc<Shared>,
    sender: mpsc::Sender<FfsMessage>,
}

impl MemoryService {
    /// Starts the service actor on the current tokio runtime.
    pub fn spawn() -> Self {
        let (sender, recv) = mpsc::channel(64);
        let (jobs, _) = broadcast::channel(256);
        let (logs, _) = broadcast::channel(256);
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            jobs,
            logs,
            shutdown: Mutex::new(CancellationToken::new()),
        });
        tokio::spawn(
            Actor {
                shared: shared.clone(),
                recv,
            }
            .run(),
        );
        Self { shared, sender }
    }

    /// A client without an instance token.
    pub fn client(&self) -> Client {
        Client::local(self.sender.clone())
    }

    /// Creates an instance and returns a client scoped to it.
    pub async fn instance(&self) -> crate::Result<Client> {
        let client = self.client();
        let (_, token) = client.create().await?;
        Ok(client.with_token(token))
    }

    /// Moves a job to `status`. Returns false for unknown jobs.
    pub fn set_job_status(&self, jid: &JobId, status: JobStatus) -> bool {
        self.shared.transition(jid, status, None)
    }

    pub fn fail_job(&self, jid: &JobId, reason: impl Into<String>) -> bool {
        self.shared
            .transition(jid, JobStatus::Failed, Some(reason.into()))
    }

    /// Pushes `job` to every job watch as-is, without validating it.
    pub fn inject_job(&self, job: rpc::Job) {
        let _ = self.shared.jobs.send((None, job));
    }

    /// Rejects uploads larger than `limit` bytes.
    pub fn set_max_upload_size(&self, limit: Option<usize>) {
        self.shared.lock().max_upload = limit;
    }

    /// Frame sizes received by the most recent upload.
    pub fn upload_frames(&self) -> Vec<usize> {
        self.shared.lock().upload_frames.clone()
    }

    pub fn blob(&self, cid: &ContentAddress) -> Option<Bytes> {
        self.shared.lock().blobs.get(cid).cloned()
    }

    /// Ends every open watch stream cleanly, as a service restart would.
    pub fn close_streams(&self) {
        let mut shutdown = self
            .shared
            .shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        shutdown.cancel();
        *shutdown = CancellationToken::new();
    }
}

impl std::fmt::Debug for MemoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryService").finish_non_exhaustive()
    }
}

impl ProtocolHandler for MemoryService {
    async fn accept(&self, conn: Connection) -> Result<(), AcceptError> {
        while let Some(msg) = read_request::<RpcProto>(&conn).await? {
            if self.sender.send(msg).await.is_err() {
                break;
            }
        }
        conn.closed().await;
        Ok(())
    }
}
