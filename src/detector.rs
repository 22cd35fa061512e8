//! CLI用の一括検出
//!
//! 画像を1枚ずつインラインでビジョンAPIに送り、フィルタ結果を集める。

use crate::error::Result;
use crate::scanner::ImageInfo;
use crate::vision::{DetectParams, ImageSource, VisionProvider};
use gym_label_common::LabelFilter;
use serde::{Deserialize, Serialize};

/// 1画像分の検出結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub file_name: String,
    pub detections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_labels: Option<Vec<String>>,
}

pub async fn detect_images(
    provider: &dyn VisionProvider,
    images: &[ImageInfo],
    params: DetectParams,
    filter: &LabelFilter,
    verbose: bool,
) -> Result<Vec<DetectionReport>> {
    let mut reports = Vec::with_capacity(images.len());

    for (idx, image) in images.iter().enumerate() {
        if verbose {
            println!("  [{}/{}] {}", idx + 1, images.len(), image.file_name);
        }

        let bytes = tokio::fs::read(&image.path).await?;
        let labels = provider
            .detect_labels(ImageSource::Bytes(bytes), params)
            .await?;

        if verbose {
            println!("    ラベル数: {}", labels.len());
        }

        let output = filter.apply(&labels)?;
        reports.push(DetectionReport {
            file_name: image.file_name.clone(),
            detections: output.detections,
            all_labels: output.all_labels,
        });
    }

    Ok(reports)
}
