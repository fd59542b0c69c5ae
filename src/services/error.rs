// src/services/error.rs
use thiserror::Error;

/// Why a single series could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("unknown series code '{0}'")]
    UnknownSeries(String),

    #[error("malformed {provider} payload: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    #[error("no observations returned for '{0}'")]
    Empty(String),
}

impl FetchError {
    pub(crate) fn parse(provider: &'static str, message: impl Into<String>) -> Self {
        FetchError::Parse { provider, message: message.into() }
    }
}
