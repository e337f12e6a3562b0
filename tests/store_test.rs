//! ローカルストアのテスト
//!
//! ファイルバックエンドでの永続化・容量制限・変更通知・APIキー保存を検証

use leaf_id::error::LeafIdError;
use leaf_id::store::{
    self, clear_api_key, save_api_key, spawn_file_watcher, stored_api_key, CollectionStore,
    CollectionUpdated, FileKeyValueStore, KeyValueStore, LocalCollectionStore,
};
use leaf_id_common::{Coordinates, SavedSpecimen, Specimen, API_KEY_KEY, COLLECTION_KEY};
use std::time::Duration;
use tempfile::TempDir;

fn record(id: &str, name: &str, coordinates: Option<Coordinates>) -> SavedSpecimen {
    SavedSpecimen {
        specimen: Specimen {
            common_name: name.to_string(),
            scientific_name: "Quercus robur".to_string(),
            native_region: "Europe".to_string(),
            properties: vec!["Deciduous".to_string(), "Long-lived".to_string()],
            description: "A large tree.".to_string(),
            image: "data:image/jpeg;base64,/9j/AAAA".to_string(),
        },
        id: id.to_string(),
        coordinates,
        location: "Palermo".to_string(),
        timestamp: "2025-12-23T10:15:30.123Z".to_string(),
    }
}

// =============================================
// load / append
// =============================================

#[test]
fn test_load_without_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = store::open_local(temp_dir.path());
    assert!(store.load().is_empty());
}

#[test]
fn test_load_corrupt_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(COLLECTION_KEY), "[{\"commonName\": ").unwrap();

    let store = store::open_local(temp_dir.path());
    assert!(store.load().is_empty());

    // 壊れた値の上にも追加できる
    store.append(record("1", "Oak", None)).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_append_preserves_prior_records() {
    let temp_dir = TempDir::new().unwrap();
    let store = store::open_local(temp_dir.path());

    let first = record("1", "Oak", None);
    let second = record("2", "Birch", Some(Coordinates::new(-34.6, -58.4)));
    store.append(first.clone()).unwrap();
    store.append(second.clone()).unwrap();

    assert_eq!(store.load(), vec![first, second]);
}

#[test]
fn test_appended_coordinates_load_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let store = store::open_local(temp_dir.path());

    // 線形合同法で散らした座標（短いリテラルでは丸め誤差が出ない）
    let mut seed: u64 = 20251223;
    let mut next = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 11) as f64 / (1u64 << 53) as f64
    };
    let mut expected = Vec::new();
    for i in 0..200 {
        let coords = Coordinates::new(next() * 180.0 - 90.0, next() * 360.0 - 180.0);
        let rec = record(&i.to_string(), "Oak", Some(coords));
        store.append(rec.clone()).unwrap();
        expected.push(rec);
    }
    let pinned = record("200", "Tipa", Some(Coordinates::new(21.791206799999998, -58.3816)));
    store.append(pinned.clone()).unwrap();
    expected.push(pinned);

    let loaded = store::open_local(temp_dir.path()).load();
    assert_eq!(loaded, expected);
}

#[test]
fn test_persisted_layout_is_json_array() {
    let temp_dir = TempDir::new().unwrap();
    let store = store::open_local(temp_dir.path());
    store.append(record("1", "Oak", None)).unwrap();

    let raw = std::fs::read_to_string(temp_dir.path().join(COLLECTION_KEY)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["commonName"], "Oak");
    assert_eq!(first["nativeRegion"], "Europe");
    assert!(first["coordinates"].is_null());
    assert_eq!(first["id"], "1");
}

#[test]
fn test_reopen_sees_previous_records() {
    let temp_dir = TempDir::new().unwrap();
    store::open_local(temp_dir.path())
        .append(record("1", "Oak", None))
        .unwrap();

    let reopened = store::open_local(temp_dir.path());
    assert_eq!(reopened.load()[0].specimen.common_name, "Oak");
}

// =============================================
// 容量・通知
// =============================================

#[test]
fn test_storage_full_keeps_previous_collection() {
    let temp_dir = TempDir::new().unwrap();
    let kv = FileKeyValueStore::with_capacity(temp_dir.path(), 600);
    let store = LocalCollectionStore::new(kv);
    let mut events = store.subscribe();

    store.append(record("1", "Oak", None)).unwrap();
    assert_eq!(events.try_recv().unwrap(), CollectionUpdated);

    let mut big = record("2", "Birch", None);
    big.specimen.image = format!("data:image/jpeg;base64,{}", "A".repeat(1000));
    let err = store.append(big).unwrap_err();
    assert!(matches!(err, LeafIdError::StorageFull));

    assert_eq!(store.load().len(), 1);
    assert!(events.try_recv().is_err());
}

#[test]
fn test_every_subscriber_is_notified() {
    let temp_dir = TempDir::new().unwrap();
    let store = store::open_local(temp_dir.path());
    let mut herbarium = store.subscribe();
    let mut arboretum = store.subscribe();

    store.append(record("1", "Oak", None)).unwrap();

    assert_eq!(herbarium.try_recv().unwrap(), CollectionUpdated);
    assert_eq!(arboretum.try_recv().unwrap(), CollectionUpdated);
    assert!(herbarium.try_recv().is_err());
}

#[tokio::test]
async fn test_watcher_sees_other_process_write() {
    let temp_dir = TempDir::new().unwrap();
    let watching = store::open_local(temp_dir.path());
    let mut events = watching.subscribe();
    let handle = spawn_file_watcher(
        watching.kv().key_path(COLLECTION_KEY),
        Duration::from_millis(20),
        watching.sender(),
    );
    tokio::time::sleep(Duration::from_millis(60)).await;

    // 別プロセス相当: 同じディレクトリを別インスタンスで開いて書く
    let writer = store::open_local(temp_dir.path());
    writer.append(record("1", "Oak", None)).unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv()).await;
    assert_eq!(event.unwrap().unwrap(), CollectionUpdated);
    assert_eq!(watching.load().len(), 1);

    handle.abort();
}

// =============================================
// APIキー
// =============================================

#[test]
fn test_api_key_persisted_trimmed() {
    let temp_dir = TempDir::new().unwrap();
    let kv = FileKeyValueStore::new(temp_dir.path());

    assert!(save_api_key(&kv, "  AIza-test  ").unwrap());
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join(API_KEY_KEY)).unwrap(),
        "AIza-test"
    );
    assert_eq!(stored_api_key(&kv).unwrap(), Some("AIza-test".to_string()));

    assert!(!save_api_key(&kv, "   ").unwrap());
    assert_eq!(stored_api_key(&kv).unwrap(), Some("AIza-test".to_string()));

    clear_api_key(&kv).unwrap();
    assert_eq!(kv.get(API_KEY_KEY).unwrap(), None);
}
