use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeafIdError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`leaf-id config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスが空です")]
    EmptyResponse,

    #[error("Failed to save specimen. Storage might be full.")]
    StorageFull,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] leaf_id_common::Error),
}

impl LeafIdError {
    /// ストア書き込みの失敗か（容量超過・IO）
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, LeafIdError::StorageFull | LeafIdError::Io(_))
    }
}

impl From<dialoguer::Error> for LeafIdError {
    fn from(e: dialoguer::Error) -> Self {
        LeafIdError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LeafIdError>;
