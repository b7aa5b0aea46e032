use std::time::Duration;

use futures::StreamExt;
use strata_client::testutil::MemoryService;
use strata_client::{CancellationToken, Client, Error, Events, PushOption, WatchLogsOption, rpc};
use strata_core::{ContentAddress, JobId, JobStatus};

const DEFAULT: [PushOption; 0] = [];
const ALL_JOBS: [JobId; 0] = [];

async fn drain<T>(events: Events<T>) -> Vec<Result<T, Error>> {
    tokio::time::timeout(Duration::from_secs(5), events.collect::<Vec<_>>())
        .await
        .expect("watch did not end")
}

/// An instance with one pushed address and the job for it.
async fn pushed(service: &MemoryService) -> (Client, ContentAddress, JobId) {
    let client = service.instance().await.unwrap();
    let cid = client.add_to_hot_bytes(b"watched content").await.unwrap();
    let jid = client.push_config(&cid, DEFAULT).await.unwrap();
    (client, cid, jid)
}

#[tokio::test]
async fn test_job_watch_delivers_transitions_then_closes() {
    let service = MemoryService::spawn();
    let (client, cid, jid) = pushed(&service).await;

    let events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .unwrap();
    assert!(service.set_job_status(&jid, JobStatus::InProgress));
    assert!(service.set_job_status(&jid, JobStatus::Success));

    let jobs: Vec<_> = drain(events)
        .await
        .into_iter()
        .map(|event| event.unwrap())
        .collect();
    let statuses: Vec<_> = jobs.iter().map(|job| job.status).collect();
    assert_eq!(statuses, vec![JobStatus::InProgress, JobStatus::Success]);
    assert!(jobs.iter().all(|job| job.id == jid && job.cid == cid));
    assert_eq!(jobs[0].instance_id, client.id().await.unwrap());
}

#[tokio::test]
async fn test_failed_job_carries_its_reason() {
    let service = MemoryService::spawn();
    let (client, _, jid) = pushed(&service).await;

    let events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .unwrap();
    assert!(service.fail_job(&jid, "no miners available"));

    let got = drain(events).await;
    assert_eq!(got.len(), 1);
    let job = got.into_iter().next().unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_reason.as_deref(), Some("no miners available"));
}

#[tokio::test]
async fn test_cancel_closes_the_watch_without_error() {
    let service = MemoryService::spawn();
    let (client, _, _) = pushed(&service).await;

    let cancel = CancellationToken::new();
    let events = client.watch_jobs(ALL_JOBS, cancel.clone()).await.unwrap();
    cancel.cancel();

    assert!(drain(events).await.is_empty());
}

#[tokio::test]
async fn test_service_ending_the_stream_is_a_clean_close() {
    let service = MemoryService::spawn();
    let (client, _, jid) = pushed(&service).await;

    let events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .unwrap();
    // Requests are handled in order, so the watch is open once this returns.
    client.id().await.unwrap();
    service.close_streams();

    assert!(drain(events).await.is_empty());
}

#[tokio::test]
async fn test_malformed_job_ends_the_watch_with_one_error() {
    let service = MemoryService::spawn();
    let (client, _, jid) = pushed(&service).await;

    let events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .unwrap();
    client.id().await.unwrap();
    service.inject_job(rpc::Job {
        id: jid.to_string(),
        instance_id: "not-an-instance".to_string(),
        cid: "not-an-address".to_string(),
        status: JobStatus::InProgress.code(),
        err_cause: String::new(),
    });
    // Never delivered, the watch is already over.
    service.set_job_status(&jid, JobStatus::Success);

    let got = drain(events).await;
    assert_eq!(got.len(), 1);
    assert!(matches!(got[0], Err(Error::Decode(_))), "{:?}", got[0]);
}

#[tokio::test]
async fn test_unknown_status_code_is_a_decode_error() {
    let service = MemoryService::spawn();
    let (client, cid, jid) = pushed(&service).await;
    let instance_id = client.id().await.unwrap();

    let events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .unwrap();
    client.id().await.unwrap();
    service.inject_job(rpc::Job {
        id: jid.to_string(),
        instance_id: instance_id.to_string(),
        cid: cid.to_string(),
        status: 42,
        err_cause: String::new(),
    });

    let got = drain(events).await;
    assert_eq!(got.len(), 1);
    assert!(matches!(got[0], Err(Error::Decode(_))), "{:?}", got[0]);
}

#[tokio::test]
async fn test_unfiltered_watch_only_sees_its_instance() {
    let service = MemoryService::spawn();
    let (client, _, jid) = pushed(&service).await;
    let (_, _, other_jid) = pushed(&service).await;

    let cancel = CancellationToken::new();
    let mut events = client.watch_jobs(ALL_JOBS, cancel.clone()).await.unwrap();
    client.id().await.unwrap();

    service.set_job_status(&other_jid, JobStatus::InProgress);
    service.set_job_status(&jid, JobStatus::InProgress);

    let job = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(job.id, jid);
    cancel.cancel();
    assert!(drain(events).await.is_empty());
}

#[tokio::test]
async fn test_log_watch_replays_and_follows_a_job() {
    let service = MemoryService::spawn();
    let (client, cid, jid) = pushed(&service).await;
    // A second job on the same address that the filter must hide.
    let other_jid = client
        .push_config(&cid, [PushOption::Override(true)])
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let mut events = client
        .watch_logs(&cid, [WatchLogsOption::JobFilter(jid)], cancel.clone())
        .await
        .unwrap();

    let queued = events.recv().await.unwrap().unwrap();
    assert_eq!(queued.job_id, jid);
    assert_eq!(queued.cid, cid);

    service.set_job_status(&other_jid, JobStatus::InProgress);
    service.set_job_status(&jid, JobStatus::InProgress);
    let progress = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(progress.job_id, jid);
    assert!(progress.timestamp >= queued.timestamp);

    cancel.cancel();
    assert!(drain(events).await.is_empty());
}
