use iroh::Endpoint;
use irpc::Client as IrpcClient;
use irpc_iroh::IrohRemoteConnection;
use strata_core::{
    AddrInfo, CidConfig, CidInfo, ContentAddress, DefaultConfig, InstanceId, InstanceInfo, Job,
    JobId, LogEntry,
};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::convert::decode_job_id;
use crate::error::{DecodeError, Error, Result};
use crate::options::{self, NewAddrOption, PushOption, WatchLogsOption};
use crate::rpc::{self, FfsMessage, RpcProto};
use crate::watch::{Events, spawn_forwarder};
use crate::{download, upload};

/// Handle to a storage service instance.
///
/// Cloning is cheap and clones share the underlying connection, so any
/// number of calls and watches can be in flight at once.
#[derive(Clone, Debug)]
pub struct Client {
    inner: IrpcClient<RpcProto>,
    config: ClientConfig,
}

impl Client {
    pub const ALPN: &'static [u8] = rpc::ALPN;

    pub fn connect(endpoint: Endpoint, addr: impl Into<iroh::EndpointAddr>) -> Self {
        let conn = IrohRemoteConnection::new(endpoint, addr.into(), Self::ALPN.to_vec());
        Client {
            inner: IrpcClient::boxed(conn),
            config: ClientConfig::default(),
        }
    }

    /// Talks to a service running in this process.
    pub fn local(sender: tokio::sync::mpsc::Sender<FfsMessage>) -> Self {
        Client {
            inner: IrpcClient::local(sender),
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Scopes the client to the instance `token` belongs to.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn token(&self) -> String {
        self.config.token.clone().unwrap_or_default()
    }

    /// Creates a new instance, returning its id and auth token.
    pub async fn create(&self) -> Result<(InstanceId, String)> {
        let resp = self.inner.rpc(rpc::Create {}).await??;
        let id = InstanceId::parse(&resp.id).map_err(DecodeError::from)?;
        Ok((id, resp.token))
    }

    pub async fn id(&self) -> Result<InstanceId> {
        let id = self
            .inner
            .rpc(rpc::InstanceIdRequest {
                token: self.token(),
            })
            .await??;
        Ok(InstanceId::parse(&id).map_err(DecodeError::from)?)
    }

    /// Wallet addresses managed by the instance.
    pub async fn addrs(&self) -> Result<Vec<AddrInfo>> {
        let addrs = self
            .inner
            .rpc(rpc::Addrs {
                token: self.token(),
            })
            .await??;
        Ok(addrs.into_iter().map(AddrInfo::from).collect())
    }

    pub async fn default_config(&self) -> Result<DefaultConfig> {
        let config = self
            .inner
            .rpc(rpc::GetDefaultConfig {
                token: self.token(),
            })
            .await??;
        Ok(config.into())
    }

    pub async fn set_default_config(&self, config: &DefaultConfig) -> Result<()> {
        config.validate()?;
        self.inner
            .rpc(rpc::SetDefaultConfig {
                token: self.token(),
                config: config.into(),
            })
            .await??;
        Ok(())
    }

    /// Creates a wallet address named `name` and returns it.
    pub async fn new_addr(
        &self,
        name: &str,
        options: impl IntoIterator<Item = NewAddrOption>,
    ) -> Result<String> {
        let req = options::build_new_addr(&self.token(), name, options);
        Ok(self.inner.rpc(req).await??)
    }

    /// The instance default prepared for `cid`.
    pub async fn get_default_cid_config(&self, cid: &ContentAddress) -> Result<CidConfig> {
        let config = self
            .inner
            .rpc(rpc::GetDefaultCidConfig {
                token: self.token(),
                cid: cid.to_string(),
            })
            .await??;
        Ok(CidConfig::try_from(config)?)
    }

    /// The config currently stored for `cid`.
    pub async fn get_cid_config(&self, cid: &ContentAddress) -> Result<CidConfig> {
        let config = self
            .inner
            .rpc(rpc::GetCidConfig {
                token: self.token(),
                cid: cid.to_string(),
            })
            .await??;
        Ok(CidConfig::try_from(config)?)
    }

    pub async fn show(&self, cid: &ContentAddress) -> Result<CidInfo> {
        let info = self
            .inner
            .rpc(rpc::Show {
                token: self.token(),
                cid: cid.to_string(),
            })
            .await??;
        Ok(CidInfo::try_from(info)?)
    }

    pub async fn info(&self) -> Result<InstanceInfo> {
        let info = self
            .inner
            .rpc(rpc::Info {
                token: self.token(),
            })
            .await??;
        Ok(InstanceInfo::try_from(info)?)
    }

    /// Moves the config of `from` to `to` and stops tracking `from`, in one
    /// job.
    pub async fn replace(&self, from: &ContentAddress, to: &ContentAddress) -> Result<JobId> {
        let jid = self
            .inner
            .rpc(rpc::Replace {
                token: self.token(),
                cid1: from.to_string(),
                cid2: to.to_string(),
            })
            .await??;
        Ok(decode_job_id(&jid)?)
    }

    /// Pushes a storage policy for `cid` and returns the job executing it.
    ///
    /// Without options the instance default applies. Replacing an existing
    /// custom policy fails with [`crate::Error::PolicyConflict`] unless
    /// [`PushOption::Override`] is set.
    pub async fn push_config(
        &self,
        cid: &ContentAddress,
        options: impl IntoIterator<Item = PushOption>,
    ) -> Result<JobId> {
        let req = options::build_push(&self.token(), cid, options)?;
        let jid = self.inner.rpc(req).await??;
        Ok(decode_job_id(&jid)?)
    }

    /// Stops tracking `cid`. Both storage tiers must already be disabled,
    /// otherwise this fails with [`crate::Error::ActiveInStorage`].
    pub async fn remove(&self, cid: &ContentAddress) -> Result<()> {
        self.inner
            .rpc(rpc::Remove {
                token: self.token(),
                cid: cid.to_string(),
            })
            .await??;
        Ok(())
    }

    /// Queues a transfer; returns before the funds move.
    pub async fn send_funds(&self, from: &str, to: &str, amount: u64) -> Result<()> {
        self.inner
            .rpc(rpc::SendFil {
                token: self.token(),
                from: from.to_string(),
                to: to.to_string(),
                amount,
            })
            .await??;
        Ok(())
    }

    /// Shuts the instance down.
    pub async fn close(&self) -> Result<()> {
        self.inner
            .rpc(rpc::Close {
                token: self.token(),
            })
            .await??;
        Ok(())
    }

    /// Watches status updates of `jids`, or of every job when empty.
    ///
    /// Returns once the stream is open. Cancel `cancel` to stop watching;
    /// see [`crate::watch`] for how the returned events end.
    pub async fn watch_jobs(
        &self,
        jids: impl IntoIterator<Item = JobId>,
        cancel: CancellationToken,
    ) -> Result<Events<Job>> {
        let jids: Vec<String> = jids.into_iter().map(|jid| jid.to_string()).collect();
        debug!("watching {} jobs", jids.len());
        let rx = self
            .inner
            .server_streaming(
                rpc::WatchJobs {
                    token: self.token(),
                    jids,
                },
                self.config.watch_channel_capacity,
            )
            .await?;
        Ok(spawn_forwarder(
            "job",
            rx,
            |job: rpc::Job| Job::try_from(job).map_err(Error::from),
            cancel,
            self.config.watch_channel_capacity,
        ))
    }

    /// Watches log messages for `cid`.
    pub async fn watch_logs(
        &self,
        cid: &ContentAddress,
        options: impl IntoIterator<Item = WatchLogsOption>,
        cancel: CancellationToken,
    ) -> Result<Events<LogEntry>> {
        let req = options::build_watch_logs(&self.token(), cid, options);
        let rx = self
            .inner
            .server_streaming(req, self.config.watch_channel_capacity)
            .await?;
        Ok(spawn_forwarder(
            "log",
            rx,
            |entry: rpc::LogEntry| LogEntry::try_from(entry).map_err(Error::from),
            cancel,
            self.config.watch_channel_capacity,
        ))
    }

    /// Uploads `source` to hot storage in [`crate::CHUNK_SIZE`] frames and
    /// returns its content address, ready to be referenced by a push.
    pub async fn add_to_hot<R>(&self, source: R) -> Result<ContentAddress>
    where
        R: AsyncRead + Unpin,
    {
        let (tx, rx) = self
            .inner
            .client_streaming(
                rpc::AddToHot {
                    token: self.token(),
                },
                self.config.upload_channel_capacity,
            )
            .await?;
        upload::send_chunks(source, tx, rx, self.config.upload_response_timeout()).await
    }

    pub async fn add_to_hot_bytes(&self, data: impl AsRef<[u8]>) -> Result<ContentAddress> {
        self.add_to_hot(data.as_ref()).await
    }

    pub async fn add_to_hot_file(&self, path: impl AsRef<std::path::Path>) -> Result<ContentAddress> {
        let file = tokio::fs::File::open(path).await?;
        self.add_to_hot(file).await
    }

    /// Streams the hot-storage content of `cid`.
    pub async fn get(
        &self,
        cid: &ContentAddress,
    ) -> Result<impl AsyncRead + Send + Unpin + 'static> {
        let rx = self
            .inner
            .server_streaming(
                rpc::Get {
                    token: self.token(),
                    cid: cid.to_string(),
                },
                self.config.download_channel_capacity,
            )
            .await?;
        Ok(download::into_reader(rx))
    }
}
