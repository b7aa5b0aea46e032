use strata_client::testutil::MemoryService;
use strata_client::{Client, Error, NewAddrOption, PushOption, ServiceError};
use strata_core::{CidConfig, ColdConfig, ConfigError, ContentAddress, HotConfig};

const DEFAULT: [PushOption; 0] = [];

async fn stored(client: &Client, data: &[u8]) -> ContentAddress {
    client.add_to_hot_bytes(data).await.unwrap()
}

/// The instance default for `cid` with a longer hot timeout.
async fn custom_config(client: &Client, cid: &ContentAddress) -> CidConfig {
    let mut config = client.get_default_cid_config(cid).await.unwrap();
    config.hot.add_timeout_secs = 90;
    config
}

fn inactive(cid: ContentAddress) -> CidConfig {
    CidConfig {
        cid,
        hot: HotConfig {
            enabled: false,
            ..HotConfig::default()
        },
        cold: ColdConfig::default(),
    }
}

#[tokio::test]
async fn test_push_without_options_uses_the_default() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let cid = stored(&client, b"defaults").await;

    let jid = client.push_config(&cid, DEFAULT).await.unwrap();
    assert!(!jid.is_empty());

    let config = client.get_cid_config(&cid).await.unwrap();
    assert_eq!(config, client.default_config().await.unwrap().for_cid(cid));
    // Replacing a default-derived config needs no override.
    client.push_config(&cid, DEFAULT).await.unwrap();
}

#[tokio::test]
async fn test_custom_config_requires_override_to_replace() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let cid = stored(&client, b"custom").await;
    let custom = custom_config(&client, &cid).await;

    client
        .push_config(&cid, [PushOption::CidConfig(custom.clone())])
        .await
        .unwrap();

    let err = client
        .push_config(&cid, [PushOption::CidConfig(custom.clone())])
        .await
        .unwrap_err();
    match err {
        Error::PolicyConflict(conflict) => assert_eq!(conflict, cid),
        other => panic!("expected a policy conflict, got {other:?}"),
    }

    let first = client
        .push_config(
            &cid,
            [PushOption::CidConfig(custom.clone()), PushOption::Override(true)],
        )
        .await
        .unwrap();
    let second = client
        .push_config(
            &cid,
            [PushOption::CidConfig(custom.clone()), PushOption::Override(true)],
        )
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(client.get_cid_config(&cid).await.unwrap(), custom);
}

#[tokio::test]
async fn test_later_override_option_wins() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let cid = stored(&client, b"ordering").await;
    let custom = custom_config(&client, &cid).await;
    client
        .push_config(&cid, [PushOption::CidConfig(custom.clone())])
        .await
        .unwrap();

    let err = client
        .push_config(
            &cid,
            [
                PushOption::Override(true),
                PushOption::CidConfig(custom),
                PushOption::Override(false),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PolicyConflict(_)), "{err:?}");
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_sending() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let cid = stored(&client, b"invalid").await;
    let other = ContentAddress::for_bytes(b"somewhere else");

    let err = client
        .push_config(&cid, [PushOption::CidConfig(inactive(other))])
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidConfig(ConfigError::AddressMismatch { .. })),
        "{err:?}"
    );

    let mut config = inactive(cid);
    config.cold.enabled = true;
    config.cold.rep_factor = 0;
    let err = client
        .push_config(&cid, [PushOption::CidConfig(config)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "{err:?}");
    assert!(matches!(
        client.get_cid_config(&cid).await.unwrap_err(),
        Error::Service(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_remove_requires_inactive_storage() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let cid = stored(&client, b"removal").await;
    client.push_config(&cid, DEFAULT).await.unwrap();

    match client.remove(&cid).await.unwrap_err() {
        Error::ActiveInStorage(active) => assert_eq!(active, cid),
        other => panic!("expected active in storage, got {other:?}"),
    }

    client
        .push_config(
            &cid,
            [PushOption::CidConfig(inactive(cid)), PushOption::Override(true)],
        )
        .await
        .unwrap();
    client.remove(&cid).await.unwrap();

    assert!(matches!(
        client.get_cid_config(&cid).await.unwrap_err(),
        Error::Service(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        client.remove(&cid).await.unwrap_err(),
        Error::Service(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_moves_the_config() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let old = stored(&client, b"old version").await;
    let new = stored(&client, b"new version").await;
    let custom = custom_config(&client, &old).await;
    client
        .push_config(&old, [PushOption::CidConfig(custom)])
        .await
        .unwrap();

    let jid = client.replace(&old, &new).await.unwrap();
    assert!(!jid.is_empty());

    let moved = client.get_cid_config(&new).await.unwrap();
    assert_eq!(moved.cid, new);
    assert_eq!(moved.hot.add_timeout_secs, 90);
    assert!(client.get_cid_config(&old).await.is_err());
    assert_eq!(client.info().await.unwrap().pins, vec![new]);
}

#[tokio::test]
async fn test_show_and_info_describe_pinned_content() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let data = b"shown content";
    let cid = stored(&client, data).await;
    client.push_config(&cid, DEFAULT).await.unwrap();

    let shown = client.show(&cid).await.unwrap();
    assert_eq!(shown.cid, cid);
    assert!(shown.hot.enabled);
    assert_eq!(shown.hot.size, data.len() as u64);
    assert!(!shown.cold.enabled);

    let info = client.info().await.unwrap();
    assert_eq!(info.id, client.id().await.unwrap());
    assert_eq!(info.pins, vec![cid]);
    assert_eq!(info.default_config, client.default_config().await.unwrap());
}

#[tokio::test]
async fn test_default_config_roundtrip_and_validation() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();

    let mut config = client.default_config().await.unwrap();
    config.cold.enabled = true;
    config.cold.rep_factor = 3;
    client.set_default_config(&config).await.unwrap();
    assert_eq!(client.default_config().await.unwrap(), config);

    config.cold.addr.clear();
    let err = client.set_default_config(&config).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "{err:?}");
}

#[tokio::test]
async fn test_addresses_and_funds() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    let initial = client.addrs().await.unwrap().remove(0);

    let addr = client
        .new_addr(
            "savings",
            [
                NewAddrOption::AddressType("secp256k1".to_string()),
                NewAddrOption::MakeDefault(true),
            ],
        )
        .await
        .unwrap();
    let addrs = client.addrs().await.unwrap();
    assert_eq!(addrs.len(), 2);
    assert_eq!(addrs[1].name, "savings");
    assert_eq!(addrs[1].addr_type, "secp256k1");
    assert_eq!(client.default_config().await.unwrap().cold.addr, addr);

    client.send_funds(&initial.addr, &addr, 250).await.unwrap();
    let info = client.info().await.unwrap();
    let balance_of = |a: &str| {
        info.balances
            .iter()
            .find(|b| b.addr.addr == a)
            .map(|b| b.balance)
            .unwrap()
    };
    assert_eq!(balance_of(&addr), 250);

    let err = client
        .send_funds(&addr, &initial.addr, 1_000)
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Service(ServiceError::InvalidArgument(_))),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_closed_instance_rejects_requests() {
    let service = MemoryService::spawn();
    let client = service.instance().await.unwrap();
    client.id().await.unwrap();

    client.close().await.unwrap();
    let err = client.id().await.unwrap_err();
    assert!(
        matches!(err, Error::Service(ServiceError::Unauthorized)),
        "{err:?}"
    );
}
