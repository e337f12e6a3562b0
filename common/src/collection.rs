//! コレクション（保存済み標本リスト）の永続化形式
//!
//! ストアの1キーにJSON配列として保存する。値が無い・壊れている場合は空コレクション扱い。

use crate::error::Result;
use crate::types::SavedSpecimen;

/// コレクションを保持するキー
pub const COLLECTION_KEY: &str = "leaf_id_collection";

/// 識別APIキーを保持するキー
pub const API_KEY_KEY: &str = "leaf_id_api_key";

/// 追加のたびに発火するイベント名
pub const COLLECTION_UPDATED_EVENT: &str = "leaf_id_collection_updated";

/// ストア全体の容量（シリアライズ後の文字数）
pub const STORE_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// これを超える画像は警告のみ出す（圧縮はしない）
pub const LARGE_IMAGE_WARN_CHARS: usize = 500_000;

/// 保存値をコレクションに復元
pub fn decode_collection(raw: Option<&str>) -> Vec<SavedSpecimen> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_default()
}

/// コレクションをJSON配列にシリアライズ
pub fn encode_collection(records: &[SavedSpecimen]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// 新しいレコードID
///
/// 作成時刻（エポックミリ秒）。直前のレコードID以下になる場合は +1 して単調増加を保つ。
pub fn next_record_id(now_millis: i64, last: Option<&SavedSpecimen>) -> String {
    let last_id = last.and_then(|r| r.id.parse::<i64>().ok());
    match last_id {
        Some(prev) if now_millis <= prev => (prev + 1).to_string(),
        _ => now_millis.to_string(),
    }
}

/// ハーバリウム表示順（新しい順）
pub fn newest_first(records: &[SavedSpecimen]) -> Vec<&SavedSpecimen> {
    records.iter().rev().collect()
}

/// IDで検索
pub fn find_by_id<'a>(records: &'a [SavedSpecimen], id: &str) -> Option<&'a SavedSpecimen> {
    records.iter().find(|r| r.id == id)
}
