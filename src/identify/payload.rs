//! 画像ファイル → Data URL
//!
//! 画像はメモリに全部読み込んでからBase64化する（リサイズ・圧縮なし）。

use crate::error::{LeafIdError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use leaf_id_common::LARGE_IMAGE_WARN_CHARS;
use std::path::Path;

/// 識別リクエストに載せる画像
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64（Data URLのカンマ以降）
    pub data: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// ファイルから読み込み（MIMEは内容から判定、だめなら拡張子）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LeafIdError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| LeafIdError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(LeafIdError::ImageLoad(format!("空のファイル: {}", path.display())));
        }

        let mime_type = detect_mime_type(&bytes, path);
        let payload = Self::from_bytes(&bytes, mime_type);

        let size = payload.data_url_len();
        if size > LARGE_IMAGE_WARN_CHARS {
            tracing::warn!(path = %path.display(), size, "Large image may exceed storage capacity");
        }
        tracing::debug!(path = %path.display(), mime = %payload.mime_type, size, "Image loaded");

        Ok(payload)
    }

    /// Data URL から復元
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        let data = extract_base64_from_data_url(data_url)?;
        Some(Self {
            mime_type: extract_mime_type_from_data_url(data_url).to_string(),
            data: data.to_string(),
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn data_url_len(&self) -> usize {
        "data:;base64,".len() + self.mime_type.len() + self.data.len()
    }
}

/// 画像のMIMEタイプを判定
pub fn detect_mime_type(bytes: &[u8], path: &Path) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
    .to_string()
}

/// Data URLからBase64データ部分を抽出
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（取れなければ image/jpeg）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("image/jpeg")
}
