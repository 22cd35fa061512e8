use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ビジョンAPIのエンドポイントが設定されていません。`VISION_ENDPOINT` を設定してください")]
    MissingEndpoint,

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("ストレージエラー: {0}")]
    Storage(String),

    #[error("不正なオブジェクトキー: {0}")]
    InvalidObjectKey(String),

    #[error("画像データが不正: {0}")]
    InvalidImage(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] gym_label_common::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
