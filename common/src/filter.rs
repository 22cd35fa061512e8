//! ラベルフィルタモジュール
//!
//! ビジョンサービスのラベル列を器具名の一覧に絞り込む。
//!
//! ## 処理フロー
//! 1. 全要素を検証（不正な要素が1つでもあれば結果を返さない）
//! 2. エイリアス変換（表にない名前はそのまま）
//! 3. 語彙フィルタ
//! 4. 除外フィルタ（語彙より優先）
//! 5. `"Name (NN.NN%)"` 形式に整形
//!
//! 入力順を保ったまま絞り込むだけで、並べ替え・重複除去はしない。

use crate::error::{Error, Result};
use crate::format::format_detection;
use crate::presets;
use crate::types::{DetectionOutput, Label, LabelSelection, RawLabel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// フィルタ設定
///
/// 構築後は変更しない。リクエスト間では `Arc` 越しに共有する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelFilter {
    /// 表示を許可する器具名
    pub vocabulary: BTreeSet<String>,
    /// プロバイダのラベル → 器具名
    pub aliases: BTreeMap<String, String>,
    /// 語彙に含まれていても出力しない名前
    pub exclusions: BTreeSet<String>,
    /// 未フィルタの全ラベルも出力に含める（診断用）
    pub include_raw: bool,
}

impl LabelFilter {
    /// 語彙のみのフィルタを作る
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions
            .extend(exclusions.into_iter().map(Into::into));
        self
    }

    pub fn with_raw(mut self, include_raw: bool) -> Self {
        self.include_raw = include_raw;
        self
    }

    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "frame" | "detect-frame" | "realtime" => Some(Self::frame_preset()),
            "upload" | "stored" => Some(Self::upload_preset()),
            _ => None,
        }
    }

    /// プリセット名の一覧（エラーメッセージ用）
    pub fn preset_names() -> &'static [&'static str] {
        &["frame", "upload"]
    }

    /// フレーム検出用プリセット
    ///
    /// エイリアス・除外なしで語彙一致のみ。全ラベルも返す。
    pub fn frame_preset() -> Self {
        Self::new(presets::FRAME_VOCABULARY.iter().copied()).with_raw(true)
    }

    /// アップロード用プリセット
    pub fn upload_preset() -> Self {
        Self::new(presets::UPLOAD_VOCABULARY.iter().copied())
            .with_aliases(presets::UPLOAD_ALIASES.iter().copied())
            .with_exclusions(presets::UPLOAD_EXCLUSIONS.iter().copied())
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let filter: Self = serde_json::from_str(json)?;
        Ok(filter)
    }

    /// プリセット名と任意のカスタム定義からフィルタを組み立てる
    ///
    /// カスタム定義が後から重ねられる（エイリアスはカスタム側が優先）。
    pub fn layered(preset: Option<&str>, custom_json: Option<&str>) -> Result<Self> {
        let mut filter = Self::default();

        if let Some(name) = preset {
            let preset_filter = Self::from_preset(name).ok_or_else(|| {
                Error::Config(format!(
                    "unknown preset '{}' ({})",
                    name,
                    Self::preset_names().join("/")
                ))
            })?;
            filter.merge(&preset_filter);
        }

        if let Some(json) = custom_json {
            filter.merge(&Self::from_json(json)?);
        }

        Ok(filter)
    }

    /// 設定をマージ（後から追加した設定が優先）
    pub fn merge(&mut self, other: &LabelFilter) {
        self.vocabulary.extend(other.vocabulary.iter().cloned());
        self.aliases.extend(
            other
                .aliases
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.exclusions.extend(other.exclusions.iter().cloned());
        self.include_raw |= other.include_raw;
    }

    /// エイリアスを解決する（表にない名前はそのまま返す）
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// 解決済みの名前を出力してよいか
    pub fn accepts(&self, resolved: &str) -> bool {
        self.vocabulary.contains(resolved) && !self.exclusions.contains(resolved)
    }

    /// ラベル列を絞り込む（書式化はしない）
    ///
    /// 不正な要素があれば `Error::InvalidLabel` を返し、部分的な結果は返さない。
    pub fn select(&self, raw: &[RawLabel]) -> Result<LabelSelection> {
        let labels = raw
            .iter()
            .enumerate()
            .map(|(index, label)| label.validate(index))
            .collect::<Result<Vec<Label>>>()?;

        let matched = labels
            .iter()
            .filter_map(|label| {
                let resolved = self.resolve(&label.name);
                self.accepts(resolved).then(|| Label {
                    name: resolved.to_string(),
                    confidence: label.confidence,
                })
            })
            .collect();

        let all = self.include_raw.then_some(labels);

        Ok(LabelSelection { matched, all })
    }

    /// ラベル列にフィルタを適用する
    ///
    /// 不正な要素があれば `Error::InvalidLabel` を返し、部分的な結果は返さない。
    pub fn apply(&self, raw: &[RawLabel]) -> Result<DetectionOutput> {
        let selection = self.select(raw)?;
        let format_all = |labels: &[Label]| -> Vec<String> {
            labels
                .iter()
                .map(|label| format_detection(&label.name, label.confidence))
                .collect()
        };

        Ok(DetectionOutput {
            detections: format_all(selection.matched.as_slice()),
            all_labels: selection.all.as_deref().map(format_all),
        })
    }
}

/// ラベル列にフィルタを適用
pub fn filter_labels(labels: &[RawLabel], filter: &LabelFilter) -> Result<DetectionOutput> {
    filter.apply(labels)
}
