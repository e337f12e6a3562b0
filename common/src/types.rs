//! 標本データの型定義
//!
//! CLIとライブラリで共有される型:
//! - Specimen: 識別結果（保存前）
//! - SavedSpecimen: コレクションに保存された標本
//! - SaveOutcome: 保存操作の結果（位置情報あり/なし）

use serde::{Deserialize, Serialize};

/// 位置情報が取得できなかった場合の location 値
pub const LOCATION_NOT_AVAILABLE: &str = "Location not available";

/// 識別結果の項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecimenField {
    CommonName,
    ScientificName,
    NativeRegion,
    Properties,
    Description,
}

impl SpecimenField {
    pub const ALL: [SpecimenField; 5] = [
        SpecimenField::CommonName,
        SpecimenField::ScientificName,
        SpecimenField::NativeRegion,
        SpecimenField::Properties,
        SpecimenField::Description,
    ];

    /// JSONキー名
    pub fn key(&self) -> &'static str {
        match self {
            SpecimenField::CommonName => "commonName",
            SpecimenField::ScientificName => "scientificName",
            SpecimenField::NativeRegion => "nativeRegion",
            SpecimenField::Properties => "properties",
            SpecimenField::Description => "description",
        }
    }
}

impl std::fmt::Display for SpecimenField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// 識別結果（1回の識別で1つ生成、以後不変）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Specimen {
    pub common_name: String,

    pub scientific_name: String,

    #[serde(alias = "origin")]
    pub native_region: String,

    /// 特徴タグ（2〜4個）
    pub properties: Vec<String>,

    #[serde(alias = "botanicalProperties")]
    pub description: String,

    /// data URI 形式の画像
    pub image: String,
}

/// 緯度経度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// 保存済み標本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSpecimen {
    #[serde(flatten)]
    pub specimen: Specimen,

    /// 作成時刻（エポックミリ秒）由来のID
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    /// 地名、または LOCATION_NOT_AVAILABLE
    #[serde(default)]
    pub location: String,

    /// ISO-8601 (UTC, ミリ秒)
    #[serde(default)]
    pub timestamp: String,
}

impl SavedSpecimen {
    pub fn has_location(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// 保存操作の結果
///
/// 位置情報の取得に失敗しても保存は成功する。どちらの経路で保存されたかをタグで区別する。
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    SavedWithLocation(SavedSpecimen),
    SavedWithoutLocation(SavedSpecimen),
}

impl SaveOutcome {
    pub fn record(&self) -> &SavedSpecimen {
        match self {
            SaveOutcome::SavedWithLocation(r) | SaveOutcome::SavedWithoutLocation(r) => r,
        }
    }

    pub fn into_record(self) -> SavedSpecimen {
        match self {
            SaveOutcome::SavedWithLocation(r) | SaveOutcome::SavedWithoutLocation(r) => r,
        }
    }

    pub fn has_location(&self) -> bool {
        matches!(self, SaveOutcome::SavedWithLocation(_))
    }
}
