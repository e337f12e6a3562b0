//! 標本キャプチャフローの状態機械
//!
//! ```text
//! Idle → AwaitingImage → Identifying → ResultReady → AwaitingLocation → Saved → Idle
//!                              ↓              ↑ (保存失敗)
//!                            Error → AwaitingImage
//! ```
//!
//! I/Oは持たない。非同期の呼び出し側（識別・位置取得・ストア書き込み）が
//! 結果に応じて遷移メソッドを呼ぶ。

use crate::error::{Error, Result};
use crate::types::{SaveOutcome, Specimen};

/// フローの状態
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CaptureState {
    #[default]
    Idle,
    AwaitingImage,
    Identifying,
    ResultReady(Specimen),
    AwaitingLocation(Specimen),
    Saved(SaveOutcome),
    /// 識別失敗（部分データは保持しない）
    Error(String),
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::AwaitingImage => "awaiting image",
            CaptureState::Identifying => "identifying",
            CaptureState::ResultReady(_) => "result ready",
            CaptureState::AwaitingLocation(_) => "awaiting location",
            CaptureState::Saved(_) => "saved",
            CaptureState::Error(_) => "error",
        }
    }
}

/// キャプチャフロー
#[derive(Debug, Clone, Default)]
pub struct CaptureFlow {
    state: CaptureState,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// 表示中の識別結果
    pub fn specimen(&self) -> Option<&Specimen> {
        match &self.state {
            CaptureState::ResultReady(s) | CaptureState::AwaitingLocation(s) => Some(s),
            _ => None,
        }
    }

    fn invalid<T>(&self, action: &'static str) -> Result<T> {
        Err(Error::InvalidTransition {
            from: self.state.name(),
            action,
        })
    }

    /// Idle → AwaitingImage（APIキー必須。空ならIdleのまま）
    pub fn begin(&mut self, api_key: Option<&str>) -> Result<()> {
        if !matches!(self.state, CaptureState::Idle) {
            return self.invalid("begin a capture");
        }
        match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => {
                self.state = CaptureState::AwaitingImage;
                Ok(())
            }
            _ => Err(Error::MissingCredential),
        }
    }

    /// AwaitingImage → Identifying（画像の読み込み完了）
    pub fn image_loaded(&mut self) -> Result<()> {
        if !matches!(self.state, CaptureState::AwaitingImage) {
            return self.invalid("load an image");
        }
        self.state = CaptureState::Identifying;
        Ok(())
    }

    /// Identifying → ResultReady
    pub fn identified(&mut self, specimen: Specimen) -> Result<()> {
        if !matches!(self.state, CaptureState::Identifying) {
            return self.invalid("accept an identification");
        }
        self.state = CaptureState::ResultReady(specimen);
        Ok(())
    }

    /// Identifying → Error
    pub fn identification_failed(&mut self, message: impl Into<String>) -> Result<()> {
        if !matches!(self.state, CaptureState::Identifying) {
            return self.invalid("report an identification failure");
        }
        self.state = CaptureState::Error(message.into());
        Ok(())
    }

    /// Error → AwaitingImage
    pub fn dismiss_error(&mut self) -> Result<()> {
        if !matches!(self.state, CaptureState::Error(_)) {
            return self.invalid("dismiss an error");
        }
        self.state = CaptureState::AwaitingImage;
        Ok(())
    }

    /// ResultReady → AwaitingLocation（ユーザーの保存操作）
    pub fn request_save(&mut self) -> Result<Specimen> {
        match std::mem::take(&mut self.state) {
            CaptureState::ResultReady(specimen) => {
                self.state = CaptureState::AwaitingLocation(specimen.clone());
                Ok(specimen)
            }
            other => {
                self.state = other;
                self.invalid("save")
            }
        }
    }

    /// ResultReady → Idle（保存せず破棄）
    pub fn discard(&mut self) -> Result<()> {
        if !matches!(self.state, CaptureState::ResultReady(_)) {
            return self.invalid("discard");
        }
        self.state = CaptureState::Idle;
        Ok(())
    }

    /// AwaitingLocation → Saved
    pub fn saved(&mut self, outcome: SaveOutcome) -> Result<()> {
        if !matches!(self.state, CaptureState::AwaitingLocation(_)) {
            return self.invalid("complete a save");
        }
        self.state = CaptureState::Saved(outcome);
        Ok(())
    }

    /// AwaitingLocation → ResultReady（ストア書き込み失敗。標本は保持）
    pub fn save_failed(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            CaptureState::AwaitingLocation(specimen) => {
                self.state = CaptureState::ResultReady(specimen);
                Ok(())
            }
            other => {
                self.state = other;
                self.invalid("report a save failure")
            }
        }
    }

    /// Saved → Idle（確認表示の後）
    pub fn finish(&mut self) -> Result<()> {
        if !matches!(self.state, CaptureState::Saved(_)) {
            return self.invalid("finish");
        }
        self.state = CaptureState::Idle;
        Ok(())
    }
}
