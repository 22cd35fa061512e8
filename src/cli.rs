use crate::flavor::Flavor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gym-relay")]
#[command(about = "ジム器具ラベル中継サーバ・検出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/gym-relay/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPサーバを起動
    Serve {
        /// バインドするホスト
        #[arg(long)]
        host: Option<String>,

        /// ポート番号
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// 画像（ファイルまたはフォルダ）のラベルを検出
    Detect {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 検出パラメータとフィルタの組 (frame/upload)
        #[arg(short, long, default_value = "frame")]
        flavor: Flavor,

        /// フィルタプリセットを上書き (frame/upload)
        #[arg(long)]
        preset: Option<String>,

        /// カスタムフィルタファイル（JSON）
        #[arg(long)]
        filter_file: Option<PathBuf>,

        /// 結果をJSONで保存
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 保存済みのラベル一覧（JSON）にフィルタを適用
    Filter {
        /// ラベル一覧JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// フィルタの組 (frame/upload)
        #[arg(short, long, default_value = "upload")]
        flavor: Flavor,

        /// フィルタプリセットを上書き (frame/upload)
        #[arg(long)]
        preset: Option<String>,

        /// カスタムフィルタファイル（JSON）
        #[arg(long)]
        filter_file: Option<PathBuf>,

        /// 結果をJSONで保存
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// フィルタ定義も表示
        #[arg(long)]
        filters: bool,
    },
}
