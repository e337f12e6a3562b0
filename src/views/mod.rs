//! ターミナル表示（Scan / Herbarium / Arboretum）

mod arboretum;
mod card;
mod herbarium;

pub use arboretum::{render_arboretum, render_grid};
pub use card::{image_summary, render_card, render_save_outcome, render_saved_card, wrap};
pub use herbarium::render_herbarium;

use chrono::DateTime;
use leaf_id_common::Tab;

/// ISO-8601 → 日付部分（解析できなければそのまま）
pub fn display_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// タブバー（選択中のタブを括弧で囲む）
pub fn render_tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.title())
            } else {
                format!(" {} ", tab.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
