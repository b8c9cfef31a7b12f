use thiserror::Error;

/// Prefix of every failure built from a non-2xx response.
pub const HTTP_FAILURE_PREFIX: &str = "Failed to fetch treasury metrics";

/// Machine tag carried by transport failures.
pub const CODE_NETWORK: &str = "network";
/// Machine tag carried by body decoding failures.
pub const CODE_DECODE: &str = "decode";

/// A failed metrics fetch.
///
/// `status` is present only when the server answered outside the 2xx range;
/// network and parsing failures carry a message and, optionally, a short
/// `code`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchFailure {
    pub message: String,
    pub status: Option<u16>,
    pub code: Option<String>,
}

/// Coarse classification of a [`FetchFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx response.
    Http,
    /// The request never produced a response.
    Transport,
    /// The response body could not be interpreted.
    Decode,
    /// Anything else without a status.
    Other,
}

impl FetchFailure {
    /// Failure for a non-2xx response.
    ///
    /// The message uses the status line's reason phrase, or `HTTP <code>`
    /// when the code has none.
    pub fn http(status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self {
            message: format!("{HTTP_FAILURE_PREFIX}: {reason}"),
            status: Some(status),
            code: None,
        }
    }

    /// Failure raised before any response arrived.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::tagged(message, CODE_NETWORK)
    }

    /// Failure interpreting a response body.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::tagged(message, CODE_DECODE)
    }

    /// Failure with only a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
        }
    }

    fn tagged(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: Some(code.to_owned()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        if self.status.is_some() {
            return FailureKind::Http;
        }
        match self.code.as_deref() {
            Some(CODE_NETWORK) => FailureKind::Transport,
            Some(CODE_DECODE) => FailureKind::Decode,
            _ => FailureKind::Other,
        }
    }
}

impl From<crate::http_client::HttpError> for FetchFailure {
    fn from(error: crate::http_client::HttpError) -> Self {
        Self::transport(error.message())
    }
}
