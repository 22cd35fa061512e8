//! ローカルファイルシステム上のオブジェクトストア
//!
//! `<root>/<bucket>/<key>` に書き込む。

use super::{ObjectRef, ObjectStore};
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// キーに対応するファイルパス
    ///
    /// 空・絶対パス・`..` を含むキーは拒否する。
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(RelayError::InvalidObjectKey(key.to_string()));
        }

        Ok(self.root.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<ObjectRef> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RelayError::Storage(format!("{}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| RelayError::Storage(format!("{}: {}", path.display(), e)))?;

        debug!(
            "stored {} bytes at {} ({})",
            bytes.len(),
            path.display(),
            content_type.unwrap_or("application/octet-stream")
        );

        Ok(ObjectRef {
            bucket: self.bucket.clone(),
            key: key.to_string(),
        })
    }
}
