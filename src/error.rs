use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API key is not set. Export X_RAPIDAPI_KEY or add it to a .env file")]
    MissingApiKey,

    #[error("Invalid search pair: {0}")]
    InvalidPair(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Report write failed: {0}")]
    ReportWrite(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] tm_screen_common::Error),
}

impl ScreenError {
    /// 現在のペアの結果だけを失うエラー
    pub fn is_pair_local(&self) -> bool {
        matches!(
            self,
            ScreenError::InvalidPair(_)
                | ScreenError::Transport(_)
                | ScreenError::RateLimited(_)
                | ScreenError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScreenError>;
