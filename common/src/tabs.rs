//! 表示タブとスワイプ操作
//!
//! 並び順: Herbarium ◀ Scan ▶ Arboretum

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    Herbarium,
    #[default]
    Scan,
    Arboretum,
}

/// スワイプ方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// 右から左へ（次のタブ）
    Left,
    /// 左から右へ（前のタブ）
    Right,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Herbarium, Tab::Scan, Tab::Arboretum];

    pub fn index(&self) -> usize {
        match self {
            Tab::Herbarium => 0,
            Tab::Scan => 1,
            Tab::Arboretum => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Herbarium => "Herbarium",
            Tab::Scan => "Scan",
            Tab::Arboretum => "Arboretum",
        }
    }

    /// スワイプ後のタブ（端では移動しない）
    pub fn swipe(self, swipe: Swipe) -> Tab {
        match (self, swipe) {
            (Tab::Herbarium, Swipe::Left) => Tab::Scan,
            (Tab::Scan, Swipe::Left) => Tab::Arboretum,
            (Tab::Arboretum, Swipe::Right) => Tab::Scan,
            (Tab::Scan, Swipe::Right) => Tab::Herbarium,
            (tab, _) => tab,
        }
    }

    /// 遷移アニメーションの向き（後ろのタブへ +1、それ以外 -1）
    pub fn direction_to(self, next: Tab) -> i8 {
        if next.index() > self.index() {
            1
        } else {
            -1
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
