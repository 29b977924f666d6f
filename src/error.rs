use thiserror::Error;

/// Failures talking to the hosted announcement store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("announcement {0} not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures reading or writing local preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preferences io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("sound output failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("sound unavailable: {0}")]
    Unavailable(String),
}
