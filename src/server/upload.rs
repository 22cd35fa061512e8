//! アップロードエンドポイント

use super::response::{ApiError, UploadResponse};
use super::AppState;
use crate::scanner::guess_content_type;
use crate::storage::object_key;
use crate::vision::ImageSource;
use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, info, warn};

/// 画像を受け取るmultipartフィールド名
pub const IMAGE_FIELD: &str = "image";

const NO_FILE: &str = "No file uploaded";
const INVALID_MULTIPART: &str = "Invalid multipart body";

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("upload: multipart error: {}", e);
        ApiError::BadRequest(INVALID_MULTIPART)
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!("upload: failed to read field: {}", e);
            ApiError::BadRequest(INVALID_MULTIPART)
        })?;

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

/// POST /upload
///
/// multipartの `image` フィールドを保存してからラベル検出する。
/// ストアがビジョンAPIから見えなければ画像バイト列を送る。
///
/// # Response
/// - `detections`: エイリアス変換・除外後の器具名
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("upload: not a multipart body: {}", rejection);
        ApiError::BadRequest(INVALID_MULTIPART)
    })?;
    let file = match read_image_field(&mut multipart).await? {
        Some(file) if !file.bytes.is_empty() => file,
        _ => {
            warn!("upload: no file uploaded");
            return Err(ApiError::BadRequest(NO_FILE));
        }
    };

    let key = object_key(&file.file_name, chrono::Utc::now().timestamp_millis());
    let content_type = file
        .content_type
        .as_deref()
        .or_else(|| guess_content_type(&file.bytes));
    debug!("upload: {} bytes as {}", file.bytes.len(), key);

    let inline = (!state.store.visible_to_vision()).then(|| file.bytes.clone());
    let object = state
        .store
        .put(&key, file.bytes, content_type)
        .await
        .map_err(ApiError::processing)?;
    info!("upload: stored {}/{}", object.bucket, object.key);

    let source = match inline {
        Some(bytes) => ImageSource::Bytes(bytes),
        None => ImageSource::StoredObject(object),
    };
    let labels = state
        .vision
        .detect_labels(source, state.upload.params)
        .await
        .map_err(ApiError::processing)?;

    let output = state.upload.filter.apply(&labels).map_err(ApiError::processing)?;
    info!(
        "upload: {} labels, {} matched: {:?}",
        labels.len(),
        output.detections.len(),
        output.detections
    );

    Ok(Json(UploadResponse {
        detections: output.detections,
    }))
}
