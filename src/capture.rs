//! 標本キャプチャのセッション
//!
//! `CaptureFlow`（状態機械）に識別・位置取得・逆ジオコーディング・ストア書き込みを繋ぐ。
//! 1セッションで同時に走る識別・位置取得はそれぞれ最大1つ。

use crate::error::{LeafIdError, Result};
use crate::geocode::ReverseGeocoder;
use crate::identify::{Identifier, ImagePayload};
use crate::location::LocationProvider;
use crate::store::CollectionStore;
use chrono::{SecondsFormat, Utc};
use leaf_id_common::{
    next_record_id, CaptureFlow, CaptureState, Coordinates, SaveOutcome, SavedSpecimen, Specimen,
    LARGE_IMAGE_WARN_CHARS, LOCATION_NOT_AVAILABLE,
};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// 保存失敗アラートでの選択
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFailureChoice {
    Retry,
    Discard,
}

impl SaveFailureChoice {
    pub const MENU: [SaveFailureChoice; 2] = [SaveFailureChoice::Retry, SaveFailureChoice::Discard];

    pub fn label(&self) -> &'static str {
        match self {
            SaveFailureChoice::Retry => "もう一度保存する",
            SaveFailureChoice::Discard => "破棄する",
        }
    }
}

pub struct CaptureSession<'a> {
    identifier: &'a dyn Identifier,
    geocoder: &'a dyn ReverseGeocoder,
    store: &'a dyn CollectionStore,
    location_timeout: Duration,
    flow: CaptureFlow,
    api_key: Option<String>,
}

impl<'a> CaptureSession<'a> {
    pub fn new(
        identifier: &'a dyn Identifier,
        geocoder: &'a dyn ReverseGeocoder,
        store: &'a dyn CollectionStore,
    ) -> Self {
        Self {
            identifier,
            geocoder,
            store,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            flow: CaptureFlow::new(),
            api_key: None,
        }
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    pub fn state(&self) -> &CaptureState {
        self.flow.state()
    }

    pub fn specimen(&self) -> Option<&Specimen> {
        self.flow.specimen()
    }

    /// キャプチャ開始。APIキーが無ければ Idle のまま MissingApiKey
    pub fn begin(&mut self, api_key: Option<&str>) -> Result<()> {
        match self.flow.begin(api_key) {
            Ok(()) => {
                self.api_key = api_key.map(|k| k.trim().to_string());
                Ok(())
            }
            Err(leaf_id_common::Error::MissingCredential) => Err(LeafIdError::MissingApiKey),
            Err(e) => Err(e.into()),
        }
    }

    /// 画像ファイルを読み込んで識別
    ///
    /// 読み込みに失敗した場合は AwaitingImage のまま（別の画像を選べる）。
    pub async fn identify_path(&mut self, path: &Path) -> Result<&Specimen> {
        if !matches!(self.flow.state(), CaptureState::AwaitingImage) {
            return Err(leaf_id_common::Error::InvalidTransition {
                from: self.flow.state().name(),
                action: "load an image",
            }
            .into());
        }
        let image = ImagePayload::load(path)?;
        self.identify(&image).await
    }

    /// 読み込み済みの画像を識別
    pub async fn identify(&mut self, image: &ImagePayload) -> Result<&Specimen> {
        self.flow.image_loaded()?;

        let api_key = self.api_key.clone().unwrap_or_default();
        match self.identifier.identify(&api_key, image).await {
            Ok(parsed) => {
                self.flow.identified(parsed.into_specimen(image.to_data_url()))?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identification failed");
                self.flow.identification_failed(e.to_string())?;
                return Err(e);
            }
        }

        self.flow
            .specimen()
            .ok_or(LeafIdError::EmptyResponse)
    }

    /// Error → AwaitingImage
    pub fn dismiss_error(&mut self) -> Result<()> {
        Ok(self.flow.dismiss_error()?)
    }

    /// 保存せずに破棄
    pub fn discard(&mut self) -> Result<()> {
        self.flow.discard()?;
        tracing::debug!("Specimen discarded");
        Ok(())
    }

    async fn acquire_location(&self, location: &dyn LocationProvider) -> Option<Coordinates> {
        match tokio::time::timeout(self.location_timeout, location.locate()).await {
            Ok(coordinates) => coordinates,
            Err(_) => {
                tracing::warn!(timeout = ?self.location_timeout, "Location request timed out");
                None
            }
        }
    }

    /// 保存（位置取得の成否にかかわらず1件追加する）
    ///
    /// ストア書き込みに失敗した場合は ResultReady に戻り、標本は保持される。
    pub async fn save(&mut self, location: &dyn LocationProvider) -> Result<SaveOutcome> {
        let specimen = self.flow.request_save()?;

        let coordinates = self.acquire_location(location).await;
        let place = match coordinates {
            Some(c) => self.geocoder.reverse_geocode(c).await,
            None => LOCATION_NOT_AVAILABLE.to_string(),
        };

        if specimen.image.len() > LARGE_IMAGE_WARN_CHARS {
            tracing::warn!(size = specimen.image.len(), "Large image may exceed storage capacity");
        }

        let now = Utc::now();
        let existing = self.store.load();
        let record = SavedSpecimen {
            specimen,
            id: next_record_id(now.timestamp_millis(), existing.last()),
            coordinates,
            location: place,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        if let Err(e) = self.store.append(record.clone()) {
            tracing::error!(error = %e, "Failed to save specimen");
            self.flow.save_failed()?;
            return Err(e);
        }

        let outcome = if record.has_location() {
            SaveOutcome::SavedWithLocation(record)
        } else {
            SaveOutcome::SavedWithoutLocation(record)
        };
        self.flow.saved(outcome.clone())?;
        Ok(outcome)
    }

    /// 保存失敗の後（ResultReady のまま）の選択を適用する。破棄なら None
    pub async fn resolve_save_failure(
        &mut self,
        choice: SaveFailureChoice,
        location: &dyn LocationProvider,
    ) -> Result<Option<SaveOutcome>> {
        match choice {
            SaveFailureChoice::Retry => {
                tracing::debug!("Retrying save");
                self.save(location).await.map(Some)
            }
            SaveFailureChoice::Discard => {
                self.discard()?;
                Ok(None)
            }
        }
    }

    /// 保存確認の後、Idle に戻す
    pub fn finish(&mut self) -> Result<()> {
        Ok(self.flow.finish()?)
    }
}
