use iroh::{Endpoint, protocol::Router};
use strata_client::testutil::MemoryService;
use strata_client::{ALPN, CHUNK_SIZE, CancellationToken, Client, PushOption};
use strata_core::{ContentAddress, JobStatus};
use tokio::io::AsyncReadExt;

/// Full client flow against the in-memory service over iroh.
///
/// This exercises:
/// - Instance creation and token scoping over a real connection.
/// - A multi-frame upload and its download.
/// - Pushing a config and watching its job to completion.
#[tokio::test]
async fn client_service_roundtrip_over_iroh() {
    let service = MemoryService::spawn();

    // Bind a fresh endpoint for the service and attach the protocol handler.
    let service_endpoint = Endpoint::builder()
        .bind()
        .await
        .expect("bind service endpoint");
    let _router = Router::builder(service_endpoint.clone())
        .accept(ALPN, service.clone())
        .spawn();

    // Bind a separate client endpoint and connect it to the service.
    let client_endpoint = Endpoint::builder()
        .bind()
        .await
        .expect("bind client endpoint");
    let client = Client::connect(client_endpoint, service_endpoint.addr());

    let (id, token) = client.create().await.expect("create instance");
    let client = client.with_token(token);
    assert_eq!(client.id().await.expect("instance id"), id);

    let payload: Vec<u8> = (0..100 * 1024).map(|i| (i % 251) as u8).collect();
    let cid = client
        .add_to_hot_bytes(&payload)
        .await
        .expect("upload succeeds");
    assert_eq!(cid, ContentAddress::for_bytes(&payload));
    assert_eq!(
        service.upload_frames(),
        vec![CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE, 4 * 1024]
    );

    let mut downloaded = Vec::new();
    client
        .get(&cid)
        .await
        .expect("download starts")
        .read_to_end(&mut downloaded)
        .await
        .expect("download succeeds");
    assert_eq!(downloaded, payload);

    let jid = client
        .push_config(&cid, [PushOption::Override(false)])
        .await
        .expect("push succeeds");
    let mut events = client
        .watch_jobs([jid], CancellationToken::new())
        .await
        .expect("watch opens");
    service.set_job_status(&jid, JobStatus::Success);

    let job = events
        .recv()
        .await
        .expect("one update")
        .expect("update decodes");
    assert_eq!(job.id, jid);
    assert_eq!(job.status, JobStatus::Success);
    assert!(events.recv().await.is_none());
}
