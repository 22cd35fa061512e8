//! ビジョンサービス連携モジュール
//!
//! ラベル検出APIはブラックボックスとして扱い、
//! (ラベル名, 信頼度%) の列だけを受け取る。

mod rekognition;

pub use rekognition::RekognitionClient;

use crate::error::{RelayError, Result};
use crate::flavor::Flavor;
use crate::storage::ObjectRef;
use async_trait::async_trait;
use gym_label_common::RawLabel;
use serde::{Deserialize, Serialize};

/// 解析対象の画像
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// 画像バイト列をそのまま送る
    Bytes(Vec<u8>),
    /// 保存済みオブジェクトを参照させる
    StoredObject(ObjectRef),
}

/// ラベル検出パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectParams {
    pub max_labels: u32,
    /// この信頼度（%）未満のラベルはAPI側で落とされる
    pub min_confidence: f32,
}

impl DetectParams {
    pub const FRAME: Self = Self {
        max_labels: 20,
        min_confidence: 20.0,
    };

    pub const UPLOAD: Self = Self {
        max_labels: 30,
        min_confidence: 35.0,
    };

    pub fn for_flavor(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Frame => Self::FRAME,
            Flavor::Upload => Self::UPLOAD,
        }
    }
}

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// 画像のラベルを検出する（順序はプロバイダの返却順）
    async fn detect_labels(&self, image: ImageSource, params: DetectParams) -> Result<Vec<RawLabel>>;
}

/// 保存済みのラベル一覧をパースする
///
/// 受け付ける形式:
/// 1. `[{"Name": ..., "Confidence": ...}, ...]`
/// 2. `{"Labels": [...]}`（DetectLabelsレスポンスそのまま）
pub fn parse_labels(json: &str) -> Result<Vec<RawLabel>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let labels = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => map
            .remove("Labels")
            .or_else(|| map.remove("labels"))
            .ok_or_else(|| RelayError::ApiParse("Labels が見つかりません".into()))?,
        _ => return Err(RelayError::ApiParse("ラベル配列ではありません".into())),
    };

    Ok(serde_json::from_value(labels)?)
}
