//! 逆ジオコーディング（Nominatim）
//!
//! 失敗はすべて吸収して "Unknown Location" を返す。保存は止めない。

use crate::config::Config;
use crate::error::{LeafIdError, Result};
use async_trait::async_trait;
use leaf_id_common::{place_label_from_body, Coordinates, UNKNOWN_LOCATION};
use std::time::Duration;

const USER_AGENT: &str = concat!("leaf-id/", env!("CARGO_PKG_VERSION"), " (leaf specimen collection)");

/// 座標 → 地名ラベル
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> String;
}

pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.geocode_timeout_seconds))
            .build()
            .map_err(|e| LeafIdError::ApiCall(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.geocode_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }

    async fn fetch(&self, coordinates: Coordinates) -> std::result::Result<String, String> {
        let response = self
            .http_client
            .get(self.reverse_url())
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> String {
        match self.fetch(coordinates).await {
            Ok(body) => {
                let label = place_label_from_body(&body);
                tracing::debug!(
                    lat = coordinates.latitude,
                    lng = coordinates.longitude,
                    label = %label,
                    "Reverse geocoded"
                );
                label
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_url() {
        let mut config = Config::default();
        let client = NominatimClient::new(&config).unwrap();
        assert_eq!(client.reverse_url(), "https://nominatim.openstreetmap.org/reverse");

        config.geocode_base = "http://localhost:9/".into();
        let client = NominatimClient::new(&config).unwrap();
        assert_eq!(client.reverse_url(), "http://localhost:9/reverse");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unknown_location() {
        let mut config = Config::default();
        config.geocode_base = "http://127.0.0.1:9".into();
        config.geocode_timeout_seconds = 2;
        let client = NominatimClient::new(&config).unwrap();

        let label = client.reverse_geocode(Coordinates::new(-34.6, -58.4)).await;
        assert_eq!(label, UNKNOWN_LOCATION);
    }
}
