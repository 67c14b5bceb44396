//! Crate-wide error type.

use thiserror::Error;

pub type EcoResult<T> = Result<T, EcoError>;

#[derive(Debug, Error)]
pub enum EcoError {
    #[cfg(feature = "native")]
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response from Supabase or the classifier backend.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("expected at most one row, got {0}")]
    MultipleRows(usize),

    #[error("auth: {0}")]
    Auth(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("config: {0}")]
    Config(String),

    #[error("qr: {0}")]
    Qr(String),

    #[error("realtime: {0}")]
    Realtime(String),
}

impl EcoError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        EcoError::Api { status, message: message.into() }
    }

    /// True for errors the user can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, EcoError::NotFound(_) | EcoError::InvalidAddress(_) | EcoError::InvalidAmount(_))
    }
}
