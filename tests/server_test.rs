//! HTTPエンドポイントテスト
//!
//! 偽のビジョンプロバイダと一時ディレクトリのストアでルータを検証

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gym_label_relay::common::RawLabel;
use gym_label_relay::error::{RelayError, Result};
use gym_label_relay::flavor::Flavor;
use gym_label_relay::server::{router, AppState, FlowSettings};
use gym_label_relay::storage::{LocalObjectStore, ObjectRef, ObjectStore};
use gym_label_relay::vision::{DetectParams, ImageSource, VisionProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const BOUNDARY: &str = "gymrelayboundary";

/// 呼び出しを記録する偽プロバイダ
struct FakeVision {
    labels: Vec<RawLabel>,
    fail: bool,
    calls: Mutex<Vec<(ImageSource, DetectParams)>>,
}

impl FakeVision {
    fn returning(labels: Vec<RawLabel>) -> Arc<Self> {
        Arc::new(Self {
            labels,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            labels: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(ImageSource, DetectParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionProvider for FakeVision {
    async fn detect_labels(&self, image: ImageSource, params: DetectParams) -> Result<Vec<RawLabel>> {
        self.calls.lock().unwrap().push((image, params));
        if self.fail {
            return Err(RelayError::ApiCall("status 503: unavailable".into()));
        }
        Ok(self.labels.clone())
    }
}

fn gym_labels() -> Vec<RawLabel> {
    vec![
        RawLabel::new("Person", 99.5),
        RawLabel::new("Gym", 97.0),
        RawLabel::new("Gym Weights", 91.23),
        RawLabel::new("Treadmill", 40.0),
    ]
}

fn app(vision: Arc<FakeVision>) -> (axum::Router, TempDir) {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LocalObjectStore::new(dir.path(), "test-bucket");
    let state = AppState::new(
        vision,
        Arc::new(store),
        FlowSettings::defaults(Flavor::Frame),
        FlowSettings::defaults(Flavor::Upload),
    );
    (router(state), dir)
}

fn frame_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/detect-frame")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
            BOUNDARY, field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app(FakeVision::returning(vec![]));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_detect_frame_success() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    // "ABC" のbase64
    let (status, body) = send(app, frame_request(json!({ "imageBase64": "QUJD", "sessionId": "1700000000" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["detectedItems"],
        json!([
            { "name": "Gym", "confidence": "97.00%" },
            { "name": "Gym Weights", "confidence": "91.23%" },
            { "name": "Treadmill", "confidence": "40.00%" }
        ])
    );
    assert_eq!(body["allLabels"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(body["allLabels"][0], json!({ "name": "Person", "confidence": "99.50%" }));

    let calls = vision.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ImageSource::Bytes(b"ABC".to_vec()));
    assert_eq!(calls[0].1, DetectParams::FRAME);
}

#[tokio::test]
async fn test_detect_frame_missing_session() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    let (status, body) = send(app, frame_request(json!({ "imageBase64": "QUJD" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing image data or session ID.");
    assert!(vision.calls().is_empty());
}

#[tokio::test]
async fn test_detect_frame_numeric_session() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    let (status, body) = send(app, frame_request(json!({ "imageBase64": "QUJD", "sessionId": 1700000000 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["detectedItems"].is_array());
    assert_eq!(vision.calls().len(), 1);
}

#[tokio::test]
async fn test_detect_frame_unpadded_base64() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    let (status, _body) = send(app, frame_request(json!({ "imageBase64": "QUI", "sessionId": "1" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(vision.calls()[0].0, ImageSource::Bytes(b"AB".to_vec()));
}

/// 壊れたJSON・JSON以外のボディも `{"message": ...}` の400で返す
#[tokio::test]
async fn test_detect_frame_rejected_bodies() {
    let cases = [
        ("application/json", r#"{"imageBase64": "QUJD", "sess"#),
        ("application/json", r#"{"imageBase64": 42, "sessionId": "1"}"#),
        ("application/json", "[]"),
        ("text/plain", "imageBase64=QUJD"),
    ];

    for (content_type, payload) in cases {
        let vision = FakeVision::returning(gym_labels());
        let (app, _dir) = app(vision.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/detect-frame")
            .header("content-type", content_type)
            .body(Body::from(payload))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body["message"], "Missing image data or session ID.", "{}", payload);
        assert!(vision.calls().is_empty());
    }
}

#[tokio::test]
async fn test_detect_frame_empty_image() {
    let (app, _dir) = app(FakeVision::returning(gym_labels()));
    let (status, body) = send(app, frame_request(json!({ "imageBase64": "", "sessionId": "1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing image data or session ID.");
}

#[tokio::test]
async fn test_detect_frame_invalid_base64() {
    let (app, _dir) = app(FakeVision::returning(gym_labels()));
    let (status, body) = send(app, frame_request(json!({ "imageBase64": "%%%", "sessionId": "1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid image data.");
}

#[tokio::test]
async fn test_detect_frame_provider_failure() {
    let (app, _dir) = app(FakeVision::failing());
    let (status, body) = send(app, frame_request(json!({ "imageBase64": "QUJD", "sessionId": "1" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error processing image");
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_detect_frame_malformed_label() {
    let labels = vec![
        RawLabel::new("Treadmill", 80.0),
        RawLabel {
            name: Some("Barbell".into()),
            confidence: None,
        },
    ];
    let (app, _dir) = app(FakeVision::returning(labels));
    let (status, body) = send(app, frame_request(json!({ "imageBase64": "QUJD", "sessionId": "1" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("detectedItems").is_none());
    assert!(body["error"].as_str().unwrap().contains("index 1"));
}

#[tokio::test]
async fn test_upload_success() {
    let vision = FakeVision::returning(gym_labels());
    let (app, dir) = app(vision.clone());

    let (status, body) = send(app, upload_request("image", "bench.jpg", b"\xFF\xD8\xFFjpeg")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "detections": ["Dumbbells / Barbells (91.23%)", "Treadmill (40.00%)"] })
    );

    // ローカルストアはビジョンAPIから見えないので画像そのものを送る
    let calls = vision.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, DetectParams::UPLOAD);
    assert_eq!(calls[0].0, ImageSource::Bytes(b"\xFF\xD8\xFFjpeg".to_vec()));

    let uploads = dir.path().join("test-bucket").join("uploads");
    let stored: Vec<_> = std::fs::read_dir(&uploads)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].to_string_lossy().ends_with("_bench.jpg"));
    assert_eq!(std::fs::read(&stored[0]).unwrap(), b"\xFF\xD8\xFFjpeg");
}

/// ビジョンAPIから読めるストアを模した偽ストア
#[derive(Default)]
struct SharedStore {
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for SharedStore {
    async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: Option<&str>) -> Result<ObjectRef> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(ObjectRef {
            bucket: "shared-bucket".into(),
            key: key.to_string(),
        })
    }

    fn visible_to_vision(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_upload_to_shared_store_sends_object_reference() {
    let vision = FakeVision::returning(gym_labels());
    let store = Arc::new(SharedStore::default());
    let state = AppState::new(
        vision.clone(),
        store.clone(),
        FlowSettings::defaults(Flavor::Frame),
        FlowSettings::defaults(Flavor::Upload),
    );

    let (status, _body) = send(router(state), upload_request("image", "rack.png", b"png")).await;
    assert_eq!(status, StatusCode::OK);

    let object = match &vision.calls()[0].0 {
        ImageSource::StoredObject(object) => object.clone(),
        other => panic!("保存済みオブジェクト参照ではない: {:?}", other),
    };
    assert_eq!(object.bucket, "shared-bucket");
    assert!(object.key.starts_with("uploads/"));
    assert!(object.key.ends_with("_rack.png"));
    assert_eq!(store.keys.lock().unwrap().as_slice(), [object.key.clone()]);
}

#[tokio::test]
async fn test_upload_empty_file() {
    let vision = FakeVision::returning(gym_labels());
    let (app, dir) = app(vision.clone());

    let (status, body) = send(app, upload_request("image", "empty.jpg", b"")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
    assert!(vision.calls().is_empty());
    assert!(!dir.path().join("test-bucket").exists());
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"image": "QUJD"}"#))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid multipart body");
    assert!(vision.calls().is_empty());
}

#[tokio::test]
async fn test_upload_truncated_multipart() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    // 終端の境界がないまま途切れたボディ
    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.jpg\"\r\n\r\npartial",
        BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid multipart body");
    assert!(vision.calls().is_empty());
}

#[tokio::test]
async fn test_upload_without_image_field() {
    let vision = FakeVision::returning(gym_labels());
    let (app, _dir) = app(vision.clone());

    let (status, body) = send(app, upload_request("document", "bench.jpg", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
    assert!(vision.calls().is_empty());
}

#[tokio::test]
async fn test_upload_provider_failure() {
    let (app, _dir) = app(FakeVision::failing());
    let (status, body) = send(app, upload_request("image", "rack.png", b"data")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error processing image");
}
