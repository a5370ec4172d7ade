// shared/src/lib.rs

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("transport: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("api: {message}")]
    Api { message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("session expired, please sign in again")]
    SessionExpired,
    #[error("decode: {0}")]
    Decode(String),
    #[error("invalid follow target: {0}")]
    InvalidTarget(String),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error ends the current session (re-login required).
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
