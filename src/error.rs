use thiserror::Error;

/// Unified application error type. The AI services degrade to fallbacks
/// instead of surfacing errors, so these cover the fatal edges only:
/// configuration and catalog I/O.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("ai service error: {0}")]
    AiService(String),
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::AiService(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::AiService(s.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
