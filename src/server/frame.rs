//! フレーム検出エンドポイント

use super::response::{ApiError, FrameResponse};
use super::AppState;
use crate::error::{RelayError, Result};
use crate::vision::ImageSource;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const MISSING_FIELDS: &str = "Missing image data or session ID.";
const INVALID_IMAGE: &str = "Invalid image data.";

/// パディングの有無を問わないbase64デコーダ
const FRAME_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    /// 文字列・数値どちらでも受け付ける
    #[serde(default)]
    pub session_id: Option<Value>,
}

/// セッションIDをログ用の文字列にする
///
/// 空文字・0・false・null・配列・オブジェクトは未指定扱い。
fn session_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// Data URL（`data:image/jpeg;base64,...`）ならデータ部分だけを取り出す
fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once(',').map(|(_, payload)| payload).unwrap_or(data)
    } else {
        data
    }
}

fn decode_frame(data: &str) -> Result<Vec<u8>> {
    let bytes = FRAME_ENGINE
        .decode(strip_data_url(data).trim())
        .map_err(|e| RelayError::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Err(RelayError::InvalidImage("空のフレーム".into()));
    }
    Ok(bytes)
}

/// POST /detect-frame
///
/// # Request
/// - `imageBase64`: base64エンコードされたフレーム
/// - `sessionId`: クライアントのセッションID
///
/// # Response
/// - `detectedItems`: 語彙に一致したラベル
/// - `allLabels`: 全ラベル（フィルタ設定で有効な場合）
pub async fn detect_frame_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FrameRequest>, JsonRejection>,
) -> std::result::Result<Json<FrameResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("detect-frame: rejected body: {}", rejection);
        ApiError::BadRequest(MISSING_FIELDS)
    })?;

    let session = request.session_id.as_ref().and_then(session_label);
    let (image, session_id) = match (&request.image_base64, session) {
        (Some(image), Some(session)) if !image.is_empty() => (image, session),
        _ => {
            warn!("detect-frame: missing image data or session id");
            return Err(ApiError::BadRequest(MISSING_FIELDS));
        }
    };

    let bytes = decode_frame(image).map_err(|e| {
        warn!("detect-frame: {} (session {})", e, session_id);
        ApiError::BadRequest(INVALID_IMAGE)
    })?;
    debug!("detect-frame: session {}, {} bytes", session_id, bytes.len());

    let labels = state
        .vision
        .detect_labels(ImageSource::Bytes(bytes), state.frame.params)
        .await
        .map_err(ApiError::processing)?;

    let selection = state.frame.filter.select(&labels).map_err(ApiError::processing)?;
    info!(
        "detect-frame: session {}, {} labels, {} matched",
        session_id,
        labels.len(),
        selection.matched.len()
    );

    Ok(Json(FrameResponse::from(&selection)))
}
