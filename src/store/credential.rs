//! 識別APIキーの保存
//!
//! 環境変数 GEMINI_API_KEY が設定されていればそちらを優先する。

use super::kv::KeyValueStore;
use crate::config::API_KEY_ENV;
use crate::error::Result;
use leaf_id_common::API_KEY_KEY;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 環境変数 > 保存値（どちらも trim、空は無し扱い）
pub fn resolve_api_key(env_value: Option<String>, stored: Option<String>) -> Option<String> {
    non_empty(env_value).or_else(|| non_empty(stored))
}

pub fn load_api_key<K: KeyValueStore + ?Sized>(kv: &K) -> Result<Option<String>> {
    let stored = kv.get(API_KEY_KEY)?;
    Ok(resolve_api_key(std::env::var(API_KEY_ENV).ok(), stored))
}

/// 保存値だけを見る（環境変数は無視）
pub fn stored_api_key<K: KeyValueStore + ?Sized>(kv: &K) -> Result<Option<String>> {
    Ok(non_empty(kv.get(API_KEY_KEY)?))
}

/// trim して空でなければ保存。保存したら true
pub fn save_api_key<K: KeyValueStore + ?Sized>(kv: &K, key: &str) -> Result<bool> {
    let key = key.trim();
    if key.is_empty() {
        return Ok(false);
    }
    kv.set(API_KEY_KEY, key)?;
    Ok(true)
}

pub fn clear_api_key<K: KeyValueStore + ?Sized>(kv: &K) -> Result<()> {
    kv.remove(API_KEY_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKeyValueStore;

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(
            resolve_api_key(Some(" env ".into()), Some("stored".into())),
            Some("env".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("   ".into()), Some(" stored ".into())),
            Some("stored".to_string())
        );
        assert_eq!(resolve_api_key(None, Some("".into())), None);
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn test_save_only_non_empty() {
        let kv = MemoryKeyValueStore::new();
        assert!(!save_api_key(&kv, "   ").unwrap());
        assert_eq!(stored_api_key(&kv).unwrap(), None);

        assert!(save_api_key(&kv, "  abc123  ").unwrap());
        assert_eq!(kv.get(API_KEY_KEY).unwrap(), Some("abc123".to_string()));
        assert_eq!(stored_api_key(&kv).unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn test_clear() {
        let kv = MemoryKeyValueStore::new();
        save_api_key(&kv, "abc").unwrap();
        clear_api_key(&kv).unwrap();
        assert_eq!(stored_api_key(&kv).unwrap(), None);
    }
}
