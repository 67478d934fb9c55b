use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigError = Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Param '{0}' required")]
    MissingParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::HttpError(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    /// Errors caused by what the caller sent rather than by this process.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::Config(_) | Error::MissingParameter(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::FeedParse(_) => "FEED_PARSE",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Timeout(_) => "TIMEOUT",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::MissingParameter(_) => "MISSING_PARAMETER",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Invalid(_) => "INVALID",
        }
    }
}
