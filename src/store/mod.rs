//! 端末ローカルの永続ストア

mod collection;
mod credential;
mod kv;
mod watch;

pub use collection::{CollectionStore, CollectionUpdated, LocalCollectionStore};
pub use credential::{clear_api_key, load_api_key, resolve_api_key, save_api_key, stored_api_key};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use watch::{spawn_file_watcher, DEFAULT_POLL_INTERVAL};

use std::path::Path;

/// データディレクトリ上のストア
pub fn open_local(dir: &Path) -> LocalCollectionStore<FileKeyValueStore> {
    tracing::debug!(dir = %dir.display(), "Opening local store");
    LocalCollectionStore::new(FileKeyValueStore::new(dir))
}
