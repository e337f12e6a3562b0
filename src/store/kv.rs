//! キー・バリューストア
//!
//! ブラウザの localStorage 相当。値は文字列、全キー合計で容量制限あり。

use crate::error::{LeafIdError, Result};
use leaf_id_common::STORE_CAPACITY_BYTES;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 容量を超える場合は StorageFull（既存の値は変更しない）
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// 1キー = 1ファイル
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    capacity: usize,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_capacity(dir, STORE_CAPACITY_BYTES)
    }

    pub fn with_capacity(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            capacity,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// 指定キー以外の使用量
    fn used_except(&self, key: &str) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut used = 0usize;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == key || name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata()?;
            if meta.is_file() {
                used += meta.len() as usize;
            }
        }
        Ok(used)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let used = self.used_except(key)?;
        if used + value.len() > self.capacity {
            tracing::warn!(key, used, size = value.len(), capacity = self.capacity, "Store capacity exceeded");
            return Err(LeafIdError::StorageFull);
        }

        std::fs::create_dir_all(&self.dir)?;

        // 一時ファイルに書いてから置き換え
        let path = self.key_path(key);
        let tmp = self.dir.join(format!(".{}.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    capacity: usize,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::with_capacity(STORE_CAPACITY_BYTES)
    }
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| LeafIdError::Config("ストアのロックに失敗".into()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.lock()?;
        let used: usize = values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        if used + value.len() > self.capacity {
            return Err(LeafIdError::StorageFull);
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
