//! Contract tests shared by every save store backend.
//!
//! SQLite runs on a temporary file. PostgreSQL runs only when
//! `ROMVAULT_TEST_DATABASE_URL` points at a scratch database.

use std::sync::Arc;
use std::time::Duration;

use romvault_core::{connect, Error, SaveKey, SaveService, SaveStore, StoreConfig};

struct TestStore {
    store: Arc<dyn SaveStore>,
    url: String,
    _dir: Option<tempfile::TempDir>,
}

async fn sqlite_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("saves.db").display());
    let store = connect(&StoreConfig::new(&url).with_max_connections(4))
        .await
        .unwrap();
    store.ensure_schema().await.unwrap();
    TestStore {
        store,
        url,
        _dir: Some(dir),
    }
}

async fn postgres_store() -> Option<TestStore> {
    let url = std::env::var("ROMVAULT_TEST_DATABASE_URL").ok()?;
    let store = connect(&StoreConfig::new(&url)).await.unwrap();
    store.ensure_schema().await.unwrap();
    Some(TestStore {
        store,
        url,
        _dir: None,
    })
}

/// Unique game name so PostgreSQL runs do not see each other's rows.
fn game(name: &str) -> String {
    format!(
        "{name}-{}.sfc",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

async fn scenario_round_trip_and_delete(store: &dyn SaveStore) {
    let game = game("zelda");
    let key = SaveKey::new(&game, "sram", 0);

    store.upsert(&key, &[1, 2, 3]).await.unwrap();
    assert_eq!(store.get_data(&key).await.unwrap(), vec![1, 2, 3]);

    let saves = store.list_by_game(&game).await.unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].size, 3);
    assert_eq!(saves[0].key, key);

    store.delete(saves[0].id).await.unwrap();
    assert!(matches!(store.get_data(&key).await, Err(Error::NotFound)));
    assert!(store.list_by_game(&game).await.unwrap().is_empty());

    // Deleting again is still a success.
    store.delete(saves[0].id).await.unwrap();
}

async fn scenario_overwrite_keeps_identity(store: &dyn SaveStore) {
    let game = game("metroid");
    let key = SaveKey::new(&game, "state", 3);

    store.upsert(&key, b"first").await.unwrap();
    let first = store.list_by_game(&game).await.unwrap().remove(0);

    tokio::time::sleep(Duration::from_millis(5)).await;
    store.upsert(&key, b"second write").await.unwrap();

    let saves = store.list_by_game(&game).await.unwrap();
    assert_eq!(saves.len(), 1);
    let second = &saves[0];
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.size, 12);
    assert_eq!(store.get_data(&key).await.unwrap(), b"second write".to_vec());
}

async fn scenario_listing_order_and_isolation(store: &dyn SaveStore) {
    let game = game("mario");
    let other = game.replace("mario", "kirby");

    store.upsert(&SaveKey::new(&game, "sram", 0), &[0]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.upsert(&SaveKey::new(&game, "state", 1), &[1, 1]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.upsert(&SaveKey::new(&game, "state", 2), &[2, 2, 2]).await.unwrap();
    store.upsert(&SaveKey::new(&other, "sram", 0), &[9]).await.unwrap();

    let saves = store.list_by_game(&game).await.unwrap();
    let slots: Vec<_> = saves.iter().map(|s| (s.key.save_type.as_str(), s.key.slot)).collect();
    assert_eq!(slots, vec![("state", 2), ("state", 1), ("sram", 0)]);

    // Touching the oldest save moves it to the front.
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.upsert(&SaveKey::new(&game, "sram", 0), &[7]).await.unwrap();
    let saves = store.list_by_game(&game).await.unwrap();
    assert_eq!(saves[0].key.save_type, "sram");
    assert_eq!(saves.len(), 3);

    assert!(store.list_by_game("nonexistent-rom").await.unwrap().is_empty());
}

async fn scenario_binary_payload(store: &dyn SaveStore) {
    let game = game("binary");
    let key = SaveKey::sram(&game);
    let data: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    store.upsert(&key, &data).await.unwrap();
    assert_eq!(store.get_data(&key).await.unwrap(), data);

    store.upsert(&key, &[]).await.unwrap();
    assert!(store.get_data(&key).await.unwrap().is_empty());
}

async fn scenario_concurrent_upserts(store: Arc<dyn SaveStore>) {
    let game = game("race");
    let key = SaveKey::new(&game, "state", 0);

    let writers: Vec<_> = (0..16u8)
        .map(|writer| {
            let store = store.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let payload = vec![writer; 4096];
                store.upsert(&key, &payload).await
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let saves = store.list_by_game(&game).await.unwrap();
    assert_eq!(saves.len(), 1);

    let data = store.get_data(&key).await.unwrap();
    assert_eq!(data.len(), 4096);
    assert!(data.iter().all(|b| *b == data[0]), "payload mixes writers");
}

async fn scenario_schema_is_idempotent(store: &dyn SaveStore) {
    let game = game("schema");
    store.upsert(&SaveKey::sram(&game), &[1]).await.unwrap();
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();
    assert_eq!(store.list_by_game(&game).await.unwrap().len(), 1);
}

/// Several independent pools provisioning the same database at once, as
/// happens when gateway replicas start together.
async fn scenario_concurrent_schema_provisioning(url: &str) {
    let provisioners: Vec<_> = (0..8)
        .map(|_| {
            let config = StoreConfig::new(url).with_max_connections(2);
            tokio::spawn(async move {
                let store = connect(&config).await?;
                store.ensure_schema().await?;
                Ok::<_, Error>(store)
            })
        })
        .collect();

    let mut stores = Vec::new();
    for provisioner in provisioners {
        stores.push(provisioner.await.unwrap().unwrap());
    }

    let game = game("replicas");
    for (slot, store) in stores.iter().enumerate() {
        store
            .upsert(&SaveKey::new(&game, "state", slot as i32), &[slot as u8])
            .await
            .unwrap();
    }
    assert_eq!(stores[0].list_by_game(&game).await.unwrap().len(), 8);
}

async fn scenario_service(store: Arc<dyn SaveStore>) {
    let service = SaveService::new(store);
    let game = game("service");

    // Defaults resolve to sram / slot 0.
    service.write_save(&game, "AQID", None, None).await.unwrap();
    assert_eq!(
        service.read_save(&game, Some("sram"), Some("0")).await.unwrap(),
        "AQID"
    );
    service
        .write_save(&game, "BAU=", Some("sram"), Some(0))
        .await
        .unwrap();
    assert_eq!(service.read_save(&game, None, None).await.unwrap(), "BAU=");
    assert_eq!(service.list_saves(&game).await.unwrap().len(), 1);

    let bad = game.replace("service", "untouched");
    let err = service
        .write_save(&bad, "not-valid-base64!!", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidEncoding(_)));
    assert!(service.list_saves(&bad).await.unwrap().is_empty());

    // Save types are opaque: surrounding whitespace makes a different slot.
    service
        .write_save(&game, "CQ==", Some(" sram "), None)
        .await
        .unwrap();
    assert_eq!(service.read_save(&game, None, None).await.unwrap(), "BAU=");
    assert_eq!(
        service.read_save(&game, Some(" sram "), None).await.unwrap(),
        "CQ=="
    );
    assert_eq!(service.list_saves(&game).await.unwrap().len(), 2);
    let padded = service
        .list_saves(&game)
        .await
        .unwrap()
        .into_iter()
        .find(|save| save.key.save_type == " sram ")
        .unwrap();
    service.delete_save(&padded.id.to_string()).await.unwrap();

    let id = service.list_saves(&game).await.unwrap()[0].id;
    service.delete_save(&id.to_string()).await.unwrap();
    service.delete_save(&id.to_string()).await.unwrap();
    assert!(matches!(
        service.read_save(&game, None, None).await,
        Err(Error::NotFound)
    ));
}

async fn run_all(test: TestStore) {
    let store = test.store.clone();
    scenario_round_trip_and_delete(store.as_ref()).await;
    scenario_overwrite_keeps_identity(store.as_ref()).await;
    scenario_listing_order_and_isolation(store.as_ref()).await;
    scenario_binary_payload(store.as_ref()).await;
    scenario_concurrent_upserts(store.clone()).await;
    scenario_schema_is_idempotent(store.as_ref()).await;
    scenario_concurrent_schema_provisioning(&test.url).await;
    scenario_service(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_contract() {
    run_all(sqlite_store().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_contract() {
    match postgres_store().await {
        Some(store) => run_all(store).await,
        None => eprintln!("ROMVAULT_TEST_DATABASE_URL not set, skipping"),
    }
}

#[tokio::test]
async fn test_sqlite_reopen_keeps_saves() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("saves.db").display());
    let key = SaveKey::new("chrono.sfc", "sram", 0);

    {
        let store = connect(&StoreConfig::new(&url)).await.unwrap();
        store.ensure_schema().await.unwrap();
        store.upsert(&key, &[42; 8]).await.unwrap();
    }

    let store = connect(&StoreConfig::new(&url)).await.unwrap();
    store.ensure_schema().await.unwrap();
    assert_eq!(store.get_data(&key).await.unwrap(), vec![42; 8]);
}
