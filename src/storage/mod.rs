//! オブジェクトストレージ連携モジュール
//!
//! アップロードフローでは画像を保存してからラベル検出する。
//! ビジョンAPIから見えるストアなら保存先を参照させ、
//! 見えないストア（ローカル）なら保存した画像をそのまま送る。

mod local;

pub use local::LocalObjectStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 保存済みオブジェクトの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<ObjectRef>;

    /// ビジョンAPIが保存先を直接読めるか
    fn visible_to_vision(&self) -> bool {
        false
    }
}

const UPLOAD_PREFIX: &str = "uploads";

/// アップロード画像の保存キーを作る（`uploads/<millis>_<name>`）
///
/// クライアントのファイル名からはパス成分を落とす。
pub fn object_key(original_name: &str, timestamp_millis: i64) -> String {
    let name = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or("upload");

    format!("{}/{}_{}", UPLOAD_PREFIX, timestamp_millis, name)
}
