use crate::error::{RelayError, Result};
use crate::flavor::Flavor;
use crate::vision::DetectParams;
use gym_label_common::LabelFilter;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// フロー別の設定
///
/// フレーム検出とアップロードで閾値・語彙が異なるため、別々に持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorConfig {
    /// ビジョンAPIに要求する最大ラベル数
    pub max_labels: u32,
    /// ビジョンAPIに要求する最低信頼度（%）
    pub min_confidence: f32,
    /// フィルタのプリセット名（空文字でプリセットなし）
    pub preset: String,
    /// プリセットに重ねるカスタムフィルタ（JSON）
    #[serde(default)]
    pub filter_file: Option<PathBuf>,
}

impl FlavorConfig {
    pub fn defaults(flavor: Flavor) -> Self {
        let params = DetectParams::for_flavor(flavor);
        Self {
            max_labels: params.max_labels,
            min_confidence: params.min_confidence,
            preset: flavor.preset_name().into(),
            filter_file: None,
        }
    }

    pub fn detect_params(&self) -> DetectParams {
        DetectParams {
            max_labels: self.max_labels,
            min_confidence: self.min_confidence,
        }
    }

    /// プリセットとカスタムファイルからフィルタを組み立てる
    pub fn build_filter(&self) -> Result<LabelFilter> {
        let custom = match &self.filter_file {
            Some(path) => {
                if !path.exists() {
                    return Err(RelayError::FileNotFound(path.display().to_string()));
                }
                Some(std::fs::read_to_string(path)?)
            }
            None => None,
        };

        let preset = (!self.preset.is_empty()).then_some(self.preset.as_str());
        Ok(LabelFilter::layered(preset, custom.as_deref())?)
    }
}

/// 設定ファイル中のフロー設定（省略したフィールドはフローの既定値）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlavorOverrides {
    max_labels: Option<u32>,
    min_confidence: Option<f32>,
    preset: Option<String>,
    filter_file: Option<PathBuf>,
}

impl FlavorOverrides {
    fn over(self, base: FlavorConfig) -> FlavorConfig {
        FlavorConfig {
            max_labels: self.max_labels.unwrap_or(base.max_labels),
            min_confidence: self.min_confidence.unwrap_or(base.min_confidence),
            preset: self.preset.unwrap_or(base.preset),
            filter_file: self.filter_file.or(base.filter_file),
        }
    }
}

fn frame_config<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<FlavorConfig, D::Error> {
    Ok(FlavorOverrides::deserialize(d)?.over(FlavorConfig::defaults(Flavor::Frame)))
}

fn upload_config<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<FlavorConfig, D::Error> {
    Ok(FlavorOverrides::deserialize(d)?.over(FlavorConfig::defaults(Flavor::Upload)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// DetectLabels互換エンドポイント（署名プロキシ等）
    pub vision_endpoint: Option<String>,
    /// エンドポイントに付与するBearerトークン
    pub vision_api_token: Option<String>,
    pub timeout_seconds: u64,
    /// アップロード先バケット名
    pub bucket: String,
    /// ローカルオブジェクトストアのルート
    pub storage_root: PathBuf,
    pub host: String,
    pub port: u16,
    #[serde(deserialize_with = "frame_config")]
    pub frame: FlavorConfig,
    #[serde(deserialize_with = "upload_config")]
    pub upload: FlavorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_endpoint: None,
            vision_api_token: None,
            timeout_seconds: 30,
            bucket: "gym-uploads".into(),
            storage_root: PathBuf::from("./storage"),
            host: "0.0.0.0".into(),
            port: 5000,
            frame: FlavorConfig::defaults(Flavor::Frame),
            upload: FlavorConfig::defaults(Flavor::Upload),
        }
    }
}

impl Config {
    /// 設定ファイル＋環境変数から読み込み
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else if path.is_some() {
            return Err(RelayError::FileNotFound(config_path.display().to_string()));
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RelayError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("gym-relay").join("config.json"))
    }

    /// 環境変数で上書き（ファイルより優先）
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("VISION_ENDPOINT") {
            self.vision_endpoint = Some(endpoint);
        }
        if let Some(token) = lookup("VISION_API_TOKEN") {
            self.vision_api_token = Some(token);
        }
        if let Some(bucket) = lookup("S3_BUCKET_NAME") {
            self.bucket = bucket;
        }
        if let Some(root) = lookup("STORAGE_ROOT") {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| RelayError::Config(format!("PORTが不正です: {}", port)))?;
        }
        Ok(())
    }

    pub fn flavor(&self, flavor: Flavor) -> &FlavorConfig {
        match flavor {
            Flavor::Frame => &self.frame,
            Flavor::Upload => &self.upload,
        }
    }

    /// 表示用（トークンは伏せる）
    pub fn masked_token(&self) -> &'static str {
        if self.vision_api_token.is_some() {
            "設定済み"
        } else {
            "未設定"
        }
    }
}
