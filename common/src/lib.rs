//! Gym Label Common Library
//!
//! 中継サーバとCLIで共有される型とラベルフィルタ
//!
//! ビジョンサービスから返るラベル列を、語彙・エイリアス・除外セットで
//! 絞り込み、クライアント向けの表示文字列に整形する。I/Oは持たない。

pub mod error;
pub mod filter;
pub mod format;
pub mod presets;
pub mod types;

pub use error::{Error, Result};
pub use filter::{filter_labels, LabelFilter};
pub use format::{format_confidence, format_detection};
pub use types::{DetectionOutput, Label, LabelSelection, RawLabel};
