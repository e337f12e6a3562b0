use clap::{Parser, Subcommand};
use leaf_id_common::PromptVariant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leaf-id")]
#[command(about = "葉の写真から樹種を識別し、標本コレクションを作るツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 標本ストアのディレクトリ（設定より優先）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 葉の写真を識別（ファイル1枚、またはフォルダ内の全画像）
    Scan {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 確認せずに保存
        #[arg(long, conflicts_with = "discard")]
        save: bool,

        /// 確認せずに破棄
        #[arg(long)]
        discard: bool,

        /// 緯度（--lng と一緒に指定）
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// 経度（--lat と一緒に指定）
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// 位置情報を使わない
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        no_location: bool,

        /// プロンプト形式 (lines/json)
        #[arg(long)]
        variant: Option<PromptVariant>,
    },

    /// 保存済み標本の一覧（新しい順）
    Herbarium {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 保存済み標本を1件表示
    Show {
        /// 標本ID
        #[arg(required = true)]
        id: String,
    },

    /// 位置付き標本を地図表示
    Arboretum,

    /// タブを切り替えながら閲覧
    Browse,

    /// コレクションの変更を監視
    Watch,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// APIキーを削除
        #[arg(long)]
        clear_api_key: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 現在の設定（既定値を含む）を設定ファイルに書き出す
        #[arg(long)]
        init: bool,
    },
}
