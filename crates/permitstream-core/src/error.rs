use std::fmt::{Display, Formatter};

/// Fetch error classification.
///
/// `retryable` is decided at construction: transport faults and upstream
/// 5xx/429 responses are worth retrying, client-side mistakes are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connect,
    UpstreamStatus,
    InvalidRequest,
    MalformedPayload,
    Internal,
}

/// Structured error returned by source adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Connect,
            message: message.into(),
            retryable: true,
        }
    }

    /// Non-success HTTP status from the upstream portal. 429 and 5xx are
    /// retryable, other statuses are treated as permanent.
    pub fn upstream_status(status: u16) -> Self {
        Self {
            kind: FetchErrorKind::UpstreamStatus,
            message: format!("upstream returned status {status}"),
            retryable: status == 429 || status >= 500,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Timeout => "fetch.timeout",
            FetchErrorKind::Connect => "fetch.connect",
            FetchErrorKind::UpstreamStatus => "fetch.upstream_status",
            FetchErrorKind::InvalidRequest => "fetch.invalid_request",
            FetchErrorKind::MalformedPayload => "fetch.malformed_payload",
            FetchErrorKind::Internal => "fetch.internal",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}
