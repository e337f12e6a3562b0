//! 対話式ブラウズ（タブ切り替え）
//!
//! Herbarium ◀ Scan ▶ Arboretum をスワイプ相当の操作か直接選択で切り替える。

use crate::error::Result;
use crate::store::CollectionStore;
use crate::views;
use dialoguer::Select;
use leaf_id_common::{Swipe, Tab};

/// 1回の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    Swipe(Swipe),
    Jump(Tab),
    Quit,
}

impl BrowseAction {
    pub const MENU: [BrowseAction; 6] = [
        BrowseAction::Swipe(Swipe::Right),
        BrowseAction::Swipe(Swipe::Left),
        BrowseAction::Jump(Tab::Herbarium),
        BrowseAction::Jump(Tab::Scan),
        BrowseAction::Jump(Tab::Arboretum),
        BrowseAction::Quit,
    ];

    pub fn label(&self) -> String {
        match self {
            BrowseAction::Swipe(Swipe::Right) => "◀ 前のタブ".to_string(),
            BrowseAction::Swipe(Swipe::Left) => "次のタブ ▶".to_string(),
            BrowseAction::Jump(tab) => format!("{} を開く", tab.title()),
            BrowseAction::Quit => "終了".to_string(),
        }
    }
}

/// 操作後のタブ（Quit は None）
pub fn apply(current: Tab, action: BrowseAction) -> Option<Tab> {
    match action {
        BrowseAction::Swipe(swipe) => Some(current.swipe(swipe)),
        BrowseAction::Jump(tab) => Some(tab),
        BrowseAction::Quit => None,
    }
}

/// タブの中身
pub fn render_tab(tab: Tab, store: &dyn CollectionStore, has_api_key: bool) -> String {
    match tab {
        Tab::Herbarium => views::render_herbarium(&store.load()),
        Tab::Arboretum => views::render_arboretum(&store.load()),
        Tab::Scan => {
            let mut out = String::from("🍃 Scan\n\n  leaf-id scan <画像またはフォルダ> で葉を識別します\n");
            if !has_api_key {
                out.push_str("  ⚠ APIキーが未設定です: leaf-id config --set-api-key YOUR_KEY\n");
            }
            out
        }
    }
}

pub fn run_browse(store: &dyn CollectionStore, has_api_key: bool) -> Result<()> {
    let mut tab = Tab::default();
    let labels: Vec<String> = BrowseAction::MENU.iter().map(|a| a.label()).collect();

    loop {
        println!("\n{}\n", views::render_tab_bar(tab));
        println!("{}", render_tab(tab, store, has_api_key));

        let choice = Select::new()
            .with_prompt("操作")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = BrowseAction::MENU[choice];
        match apply(tab, action) {
            Some(next) => {
                tracing::debug!(from = %tab, to = %next, direction = tab.direction_to(next), "Tab changed");
                tab = next;
            }
            None => break,
        }
    }

    Ok(())
}
