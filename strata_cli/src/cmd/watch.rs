use anyhow::{Context, Result, bail};
use strata_client::{CancellationToken, Client, WatchLogsOption};
use strata_core::{ContentAddress, JobId, JobStatus};
use tracing::debug;

/// A token canceled by ctrl-c.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, closing watch");
            cancel.cancel();
        }
    });
    token
}

/// Prints job updates until the service ends the watch or ctrl-c.
pub async fn run_watch(client: &Client, jids: Vec<JobId>) -> Result<()> {
    let mut events = client.watch_jobs(jids, cancel_on_ctrl_c()).await?;
    let mut failed = 0usize;
    while let Some(event) = events.recv().await {
        let job = event.context("job watch failed")?;
        match &job.failure_reason {
            Some(reason) => println!("{}\t{}\t{}: {reason}", job.id, job.cid, job.status),
            None => println!("{}\t{}\t{}", job.id, job.cid, job.status),
        }
        if job.status == JobStatus::Failed {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} job(s) failed");
    }
    Ok(())
}

pub async fn run_logs(client: &Client, cid: ContentAddress, jid: Option<JobId>) -> Result<()> {
    let options = jid.map(WatchLogsOption::JobFilter);
    let mut events = client
        .watch_logs(&cid, options, cancel_on_ctrl_c())
        .await?;
    while let Some(event) = events.recv().await {
        let entry = event.context("log watch failed")?;
        let secs = entry
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        println!("{secs}\t{}\t{}", entry.job_id, entry.message);
    }
    Ok(())
}
