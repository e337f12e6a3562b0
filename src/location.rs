//! 端末位置の取得
//!
//! 取得できない（拒否・タイムアウト・情報なし）は None。呼び出し側で待ち時間を制限する。

use crate::scanner::extract_gps;
use async_trait::async_trait;
use leaf_id_common::Coordinates;
use std::path::PathBuf;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Option<Coordinates>;
}

/// 位置の取得元
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// --lat/--lng で指定
    Fixed(Coordinates),
    /// 写真のEXIF GPS
    ExifGps(PathBuf),
    /// 位置情報なし（--no-location）
    Denied,
}

impl LocationSource {
    /// コマンドライン引数から選ぶ（明示座標 > 拒否 > EXIF）
    pub fn from_args(lat: Option<f64>, lng: Option<f64>, no_location: bool, image: PathBuf) -> Self {
        match (lat, lng) {
            (Some(latitude), Some(longitude)) => LocationSource::Fixed(Coordinates::new(latitude, longitude)),
            _ if no_location => LocationSource::Denied,
            _ => LocationSource::ExifGps(image),
        }
    }
}

fn is_valid(c: &Coordinates) -> bool {
    (-90.0..=90.0).contains(&c.latitude) && (-180.0..=180.0).contains(&c.longitude)
}

#[async_trait]
impl LocationProvider for LocationSource {
    async fn locate(&self) -> Option<Coordinates> {
        let coordinates = match self {
            LocationSource::Fixed(c) => Some(*c),
            LocationSource::Denied => None,
            LocationSource::ExifGps(path) => {
                let path = path.clone();
                let result = tokio::task::spawn_blocking(move || {
                    extract_gps(&path).map_err(|e| e.to_string())
                })
                .await;
                match result {
                    Ok(Ok(c)) => Some(c),
                    Ok(Err(e)) => {
                        tracing::debug!(error = %e, "No GPS position in image");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "GPS extraction task failed");
                        None
                    }
                }
            }
        };

        coordinates.filter(is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_precedence() {
        let image = PathBuf::from("leaf.jpg");
        assert_eq!(
            LocationSource::from_args(Some(1.0), Some(2.0), true, image.clone()),
            LocationSource::Fixed(Coordinates::new(1.0, 2.0))
        );
        assert_eq!(
            LocationSource::from_args(Some(1.0), None, true, image.clone()),
            LocationSource::Denied
        );
        assert_eq!(
            LocationSource::from_args(None, None, false, image.clone()),
            LocationSource::ExifGps(image)
        );
    }

    #[tokio::test]
    async fn test_fixed_and_denied() {
        let fixed = LocationSource::Fixed(Coordinates::new(-34.6, -58.4));
        assert_eq!(fixed.locate().await, Some(Coordinates::new(-34.6, -58.4)));
        assert_eq!(LocationSource::Denied.locate().await, None);
    }

    #[tokio::test]
    async fn test_out_of_range_is_rejected() {
        let fixed = LocationSource::Fixed(Coordinates::new(120.0, 0.0));
        assert_eq!(fixed.locate().await, None);
    }

    #[tokio::test]
    async fn test_exif_without_gps() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("leaf.jpg");
        std::fs::write(&path, b"no exif here").unwrap();

        assert_eq!(LocationSource::ExifGps(path).locate().await, None);
    }
}
