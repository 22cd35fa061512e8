//! DetectLabels互換APIクライアント
//!
//! リクエスト/レスポンスはRekognitionのJSONワイヤ形式。
//! 署名はエンドポイント側（署名プロキシ・ゲートウェイ）に任せ、
//! ここでは任意のBearerトークンだけを付ける。

use super::{DetectParams, ImageSource, VisionProvider};
use crate::config::Config;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use gym_label_common::RawLabel;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DETECT_LABELS_TARGET: &str = "RekognitionService.DetectLabels";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsRequest {
    image: WireImage,
    max_labels: u32,
    min_confidence: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<String>,
    #[serde(rename = "S3Object", skip_serializing_if = "Option::is_none")]
    s3_object: Option<WireS3Object>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireS3Object {
    bucket: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsResponse {
    #[serde(default)]
    labels: Vec<RawLabel>,
}

impl DetectLabelsRequest {
    fn new(image: ImageSource, params: DetectParams) -> Self {
        let image = match image {
            ImageSource::Bytes(bytes) => WireImage {
                bytes: Some(general_purpose::STANDARD.encode(bytes)),
                s3_object: None,
            },
            ImageSource::StoredObject(object) => WireImage {
                bytes: None,
                s3_object: Some(WireS3Object {
                    bucket: object.bucket,
                    name: object.key,
                }),
            },
        };

        Self {
            image,
            max_labels: params.max_labels,
            min_confidence: params.min_confidence,
        }
    }
}

pub struct RekognitionClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl RekognitionClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config
            .vision_endpoint
            .clone()
            .ok_or(RelayError::MissingEndpoint)?;
        Self::new(
            endpoint,
            config.vision_api_token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VisionProvider for RekognitionClient {
    async fn detect_labels(&self, image: ImageSource, params: DetectParams) -> Result<Vec<RawLabel>> {
        let body = serde_json::to_vec(&DetectLabelsRequest::new(image, params))?;
        debug!(
            "DetectLabels: {} bytes, max_labels={}, min_confidence={}",
            body.len(),
            params.max_labels,
            params.min_confidence
        );

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", DETECT_LABELS_TARGET)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("DetectLabels failed with status {}: {}", status, text);
            return Err(RelayError::ApiCall(format!("status {}: {}", status, text)));
        }

        let text = response.text().await?;
        let parsed: DetectLabelsResponse = serde_json::from_str(&text)
            .map_err(|e| RelayError::ApiParse(format!("DetectLabels: {}", e)))?;

        debug!("DetectLabels returned {} labels", parsed.labels.len());
        Ok(parsed.labels)
    }
}
