//! レスポンス型とエラー応答

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gym_label_common::{format_confidence, Label, LabelSelection};
use serde::{Deserialize, Serialize};
use tracing::error;

/// フレーム検出の1件（`{"name": "Treadmill", "confidence": "81.20%"}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    pub confidence: String,
}

impl From<&Label> for DetectedItem {
    fn from(label: &Label) -> Self {
        Self {
            name: label.name.clone(),
            confidence: format!("{}%", format_confidence(label.confidence)),
        }
    }
}

/// フレーム検出のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResponse {
    pub detected_items: Vec<DetectedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_labels: Option<Vec<DetectedItem>>,
}

impl From<&LabelSelection> for FrameResponse {
    fn from(selection: &LabelSelection) -> Self {
        let items = |labels: &[Label]| -> Vec<DetectedItem> {
            labels.iter().map(DetectedItem::from).collect()
        };
        Self {
            detected_items: items(&selection.matched),
            all_labels: selection.all.as_deref().map(items),
        }
    }
}

/// アップロードのレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub detections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// クライアント入力の不備（400）
    BadRequest(&'static str),
    /// 外部サービス・フィルタの失敗（500）
    Processing(String),
}

pub const PROCESSING_FAILED: &str = "Error processing image";

impl ApiError {
    pub fn processing(err: impl std::fmt::Display) -> Self {
        ApiError::Processing(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: message.to_string(),
                    error: None,
                },
            ),
            ApiError::Processing(detail) => {
                error!("{}: {}", PROCESSING_FAILED, detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: PROCESSING_FAILED.to_string(),
                        error: Some(detail),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
