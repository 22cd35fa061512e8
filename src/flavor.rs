use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// リクエストフロー
///
/// - Frame: base64フレームをそのままビジョンAPIへ
/// - Upload: ファイルを保存してから保存先を参照させる
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Frame,
    Upload,
}

impl Flavor {
    pub fn preset_name(&self) -> &'static str {
        match self {
            Flavor::Frame => "frame",
            Flavor::Upload => "upload",
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.preset_name())
    }
}
