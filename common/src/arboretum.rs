//! アーボレタム（地図）表示の計算
//!
//! OpenStreetMapの埋め込み地図に、座標付き標本をピンとして重ねる。
//! 地図の中心は全標本の平均座標、標本がなければブエノスアイレス。

use crate::types::{Coordinates, SavedSpecimen};

/// 標本がない場合の地図中心（ブエノスアイレス）
pub const FALLBACK_CENTER: Coordinates = Coordinates {
    latitude: -34.6037,
    longitude: -58.3816,
};

/// 中心からの表示範囲（度）
pub const BBOX_HALF_SPAN: f64 = 0.02;

/// 地図の表示範囲
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinates) -> Self {
        Self {
            west: center.longitude - BBOX_HALF_SPAN,
            south: center.latitude - BBOX_HALF_SPAN,
            east: center.longitude + BBOX_HALF_SPAN,
            north: center.latitude + BBOX_HALF_SPAN,
        }
    }

    /// OpenStreetMap 埋め込みURL
    pub fn embed_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/export/embed.html?bbox={},{},{},{}&layer=mapnik",
            self.west, self.south, self.east, self.north
        )
    }
}

/// 地図上のピン（位置は地図枠に対する%）
#[derive(Debug, Clone, PartialEq)]
pub struct MapPin<'a> {
    pub specimen: &'a SavedSpecimen,
    pub x_percent: f64,
    pub y_percent: f64,
}

/// 座標付き標本だけを抽出
pub fn located(records: &[SavedSpecimen]) -> Vec<&SavedSpecimen> {
    records.iter().filter(|r| r.coordinates.is_some()).collect()
}

/// 地図中心（平均座標 / 標本がなければ FALLBACK_CENTER）
pub fn map_center(records: &[SavedSpecimen]) -> Coordinates {
    let coords: Vec<Coordinates> = records.iter().filter_map(|r| r.coordinates).collect();
    if coords.is_empty() {
        return FALLBACK_CENTER;
    }

    let n = coords.len() as f64;
    Coordinates {
        latitude: coords.iter().map(|c| c.latitude).sum::<f64>() / n,
        longitude: coords.iter().map(|c| c.longitude).sum::<f64>() / n,
    }
}

/// 座標を地図枠内の位置（0〜100%）に変換
pub fn to_map_percent(center: Coordinates, point: Coordinates) -> (f64, f64) {
    let span = BBOX_HALF_SPAN * 2.0;
    let rel_x = (point.longitude - (center.longitude - BBOX_HALF_SPAN)) / span;
    let rel_y = (center.latitude + BBOX_HALF_SPAN - point.latitude) / span;

    ((rel_x * 100.0).clamp(0.0, 100.0), (rel_y * 100.0).clamp(0.0, 100.0))
}

/// ピン一覧
pub fn map_pins(records: &[SavedSpecimen], center: Coordinates) -> Vec<MapPin<'_>> {
    records
        .iter()
        .filter_map(|r| {
            let coords = r.coordinates?;
            let (x_percent, y_percent) = to_map_percent(center, coords);
            Some(MapPin {
                specimen: r,
                x_percent,
                y_percent,
            })
        })
        .collect()
}
