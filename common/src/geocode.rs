//! 逆ジオコーディング（Nominatim）のレスポンス型と地名選択

use serde::{Deserialize, Serialize};

/// 逆ジオコーディングに失敗した、または地名が見つからない場合の地名
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Nominatim `reverse` レスポンス（必要な部分のみ）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<Address>,
}

/// 住所の地域フィールド
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
}

impl Address {
    /// neighbourhood > suburb > city > town の順で最初に値のあるもの
    pub fn place_label(&self) -> Option<&str> {
        [&self.neighbourhood, &self.suburb, &self.city, &self.town]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// レスポンスから地名を選ぶ（なければ UNKNOWN_LOCATION）
pub fn select_place_label(response: &ReverseResponse) -> String {
    response
        .address
        .as_ref()
        .and_then(Address::place_label)
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

/// レスポンス本文から地名を選ぶ（パース失敗も UNKNOWN_LOCATION）
pub fn place_label_from_body(body: &str) -> String {
    serde_json::from_str::<ReverseResponse>(body)
        .map(|r| select_place_label(&r))
        .unwrap_or_else(|_| UNKNOWN_LOCATION.to_string())
}
