//! ラベルと検出結果の型定義
//!
//! - RawLabel: ビジョンサービスのレスポンス要素（未検証）
//! - Label: 検証済みの (名前, 信頼度%) ペア
//! - LabelSelection: フィルタ後・書式化前のラベル
//! - DetectionOutput: フィルタ後のクライアント向け出力

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 信頼度の下限（%）
pub const MIN_CONFIDENCE: f64 = 0.0;
/// 信頼度の上限（%）
pub const MAX_CONFIDENCE: f64 = 100.0;

/// ビジョンサービスから受け取ったラベル要素
///
/// 欠損を検出できるよう両フィールドとも Option で受ける。
/// AWS形式（`Name` / `Confidence`）と小文字形式の両方を読める。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLabel {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,

    #[serde(default, alias = "Confidence")]
    pub confidence: Option<f64>,
}

impl RawLabel {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: Some(name.into()),
            confidence: Some(confidence),
        }
    }

    /// 検証して Label に変換する
    ///
    /// 値の補正は行わない。名前・信頼度の欠損、非有限値、範囲外の信頼度は
    /// `Error::InvalidLabel` になる。
    pub fn validate(&self, index: usize) -> Result<Label> {
        let invalid = |reason: &str| Error::InvalidLabel {
            index,
            reason: reason.to_string(),
        };

        let name = self.name.as_ref().ok_or_else(|| invalid("name is missing"))?;
        let confidence = self
            .confidence
            .ok_or_else(|| invalid("confidence is missing"))?;

        if !confidence.is_finite() {
            return Err(invalid("confidence is not a finite number"));
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(Error::InvalidLabel {
                index,
                reason: format!("confidence {} is outside 0-100", confidence),
            });
        }

        Ok(Label {
            name: name.clone(),
            confidence,
        })
    }
}

impl From<Label> for RawLabel {
    fn from(label: Label) -> Self {
        Self {
            name: Some(label.name),
            confidence: Some(label.confidence),
        }
    }
}

/// 検証済みラベル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// 信頼度（0〜100 のパーセンテージ）
    pub confidence: f64,
}

/// 書式化前のフィルタ結果
///
/// `matched` の名前はエイリアス解決済み。`all` はプロバイダの名前のまま。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSelection {
    pub matched: Vec<Label>,
    pub all: Option<Vec<Label>>,
}

/// フィルタ結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionOutput {
    /// 語彙に一致したラベル（`"Name (NN.NN%)"` 形式、入力順）
    pub detections: Vec<String>,

    /// 全ラベル（診断用、raw passthrough 有効時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_labels: Option<Vec<String>>,
}

impl DetectionOutput {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
