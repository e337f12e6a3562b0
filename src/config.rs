use crate::error::{LeafIdError, Result};
use leaf_id_common::PromptVariant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_GEOCODE_BASE: &str = "https://nominatim.openstreetmap.org";

/// APIキーより優先される環境変数
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    pub geocode_base: String,
    pub timeout_seconds: u64,
    pub geocode_timeout_seconds: u64,
    pub location_timeout_seconds: u64,
    pub prompt_variant: PromptVariant,
    /// 標本ストアの保存先（省略時はデータディレクトリ/leaf-id）
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LeafIdError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("leaf-id").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            geocode_base: DEFAULT_GEOCODE_BASE.into(),
            timeout_seconds: 120,
            geocode_timeout_seconds: 10,
            location_timeout_seconds: 10,
            prompt_variant: PromptVariant::default(),
            data_dir: None,
        }
    }

    /// ストアのディレクトリ（引数 > 設定 > 既定）
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| LeafIdError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("leaf-id"))
    }

    /// generateContent エンドポイント（キーは付けない）
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}
