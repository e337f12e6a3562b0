//! 別プロセスによるコレクション変更の検出
//!
//! キーファイルの更新時刻とサイズをポーリングし、変わったら CollectionUpdated を送る。

use super::collection::CollectionUpdated;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = std::fs::metadata(path).ok()?;
    Some(Fingerprint {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

/// ファイルの変化を監視するタスクを起動
///
/// 起動時点の状態を基準にする。ファイルの作成・削除も変化として扱う。
pub fn spawn_file_watcher(
    path: PathBuf,
    interval: Duration,
    events: broadcast::Sender<CollectionUpdated>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = fingerprint(&path);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let current = fingerprint(&path);
            if current == last {
                continue;
            }
            last = current;

            tracing::debug!(path = %path.display(), "Collection changed on disk");
            if events.send(CollectionUpdated).is_err() && events.receiver_count() == 0 {
                tracing::debug!("No subscribers left, stopping watcher");
                break;
            }
        }
    })
}
