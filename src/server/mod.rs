//! HTTPサーバ
//!
//! - POST /detect-frame: base64フレーム → ラベル検出 → フィルタ
//! - POST /upload: multipartファイル → 保存 → 保存先でラベル検出 → フィルタ
//! - GET /health

mod frame;
mod response;
mod upload;

pub use frame::{detect_frame_handler, FrameRequest};
pub use response::{ApiError, DetectedItem, ErrorBody, FrameResponse, UploadResponse};
pub use upload::upload_handler;

use crate::config::{Config, FlavorConfig};
use crate::error::Result;
use crate::flavor::Flavor;
use crate::storage::ObjectStore;
use crate::vision::{DetectParams, VisionProvider};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use gym_label_common::LabelFilter;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// リクエストボディの上限（10MB）
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// フローごとの検出パラメータとフィルタ
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub params: DetectParams,
    pub filter: LabelFilter,
}

impl FlowSettings {
    pub fn new(params: DetectParams, filter: LabelFilter) -> Self {
        Self { params, filter }
    }

    pub fn from_config(flavor: &FlavorConfig) -> Result<Self> {
        Ok(Self::new(flavor.detect_params(), flavor.build_filter()?))
    }

    /// 組み込みの既定値
    pub fn defaults(flavor: Flavor) -> Self {
        let filter = match flavor {
            Flavor::Frame => LabelFilter::frame_preset(),
            Flavor::Upload => LabelFilter::upload_preset(),
        };
        Self::new(DetectParams::for_flavor(flavor), filter)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<dyn VisionProvider>,
    pub store: Arc<dyn ObjectStore>,
    pub frame: Arc<FlowSettings>,
    pub upload: Arc<FlowSettings>,
}

impl AppState {
    pub fn new(
        vision: Arc<dyn VisionProvider>,
        store: Arc<dyn ObjectStore>,
        frame: FlowSettings,
        upload: FlowSettings,
    ) -> Self {
        Self {
            vision,
            store,
            frame: Arc::new(frame),
            upload: Arc::new(upload),
        }
    }

    pub fn from_config(
        config: &Config,
        vision: Arc<dyn VisionProvider>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        Ok(Self::new(
            vision,
            store,
            FlowSettings::from_config(&config.frame)?,
            FlowSettings::from_config(&config.upload)?,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/detect-frame", post(detect_frame_handler))
        .route("/upload", post(upload_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
