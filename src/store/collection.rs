//! 標本コレクションのストア
//!
//! 追加は read-modify-write。プロセス間の排他はしない（同時追加の取りこぼしは許容）。
//! 追加に成功するたびに購読者全員へ CollectionUpdated を送る。

use super::kv::KeyValueStore;
use crate::error::Result;
use leaf_id_common::{decode_collection, encode_collection, SavedSpecimen, COLLECTION_KEY, COLLECTION_UPDATED_EVENT};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// コレクション変更の通知（ペイロードなし。受け手は load し直す）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionUpdated;

impl CollectionUpdated {
    pub fn name(&self) -> &'static str {
        COLLECTION_UPDATED_EVENT
    }
}

pub trait CollectionStore: Send + Sync {
    /// 値が無い・壊れている場合は空
    fn load(&self) -> Vec<SavedSpecimen>;

    fn append(&self, record: SavedSpecimen) -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<CollectionUpdated>;
}

pub struct LocalCollectionStore<K: KeyValueStore> {
    kv: K,
    events: broadcast::Sender<CollectionUpdated>,
}

impl<K: KeyValueStore> LocalCollectionStore<K> {
    pub fn new(kv: K) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { kv, events }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// 外部（別プロセス）の変更を購読者へ伝える
    pub fn notify(&self) {
        // 購読者がいなければ送信エラーになるが無視してよい
        let _ = self.events.send(CollectionUpdated);
    }

    pub fn sender(&self) -> broadcast::Sender<CollectionUpdated> {
        self.events.clone()
    }
}

impl<K: KeyValueStore> CollectionStore for LocalCollectionStore<K> {
    fn load(&self) -> Vec<SavedSpecimen> {
        match self.kv.get(COLLECTION_KEY) {
            Ok(raw) => decode_collection(raw.as_deref()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read collection, treating as empty");
                Vec::new()
            }
        }
    }

    /// 読み込み自体の失敗は伝播する（壊れた値・未保存のみ空から始める）
    fn append(&self, record: SavedSpecimen) -> Result<()> {
        let raw = self.kv.get(COLLECTION_KEY)?;
        let mut records = decode_collection(raw.as_deref());
        let id = record.id.clone();
        records.push(record);

        let raw = encode_collection(&records)?;
        self.kv.set(COLLECTION_KEY, &raw)?;

        tracing::info!(id = %id, total = records.len(), "Specimen saved");
        self.notify();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<CollectionUpdated> {
        self.events.subscribe()
    }
}
