//! 葉の識別（リモートのマルチモーダルモデル）

mod gemini;
mod payload;

pub use gemini::{parse_response_body, GeminiClient};
pub use payload::{
    detect_mime_type, extract_base64_from_data_url, extract_mime_type_from_data_url, ImagePayload,
};

use crate::error::Result;
use async_trait::async_trait;
use leaf_id_common::ParsedIdentification;

/// 画像 → 識別結果
///
/// 失敗（通信・HTTPエラー・空レスポンス）は部分結果なしのエラー。
#[async_trait]
pub trait Identifier: Send + Sync {
    async fn identify(&self, api_key: &str, image: &ImagePayload) -> Result<ParsedIdentification>;
}
