#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Remote API error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Spreadsheet error: {message}")]
    Sheet { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure is worth retrying with backoff.
    ///
    /// Rate limits and transient server errors are retryable; bad requests,
    /// auth failures, missing resources and gateway timeouts fail fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { status, .. } => matches!(status, 403 | 429 | 500 | 502 | 503),
            Self::Reqwest(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Short operator-facing label for a remote status code.
pub fn status_label(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "invalid credentials",
        403 => "rate limit exceeded",
        404 => "file not found",
        429 => "too many requests",
        500 => "backend error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => "unexpected status",
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        for status in [403, 429, 500, 502, 503] {
            assert!(AppError::remote(status, "x").is_retryable(), "{status}");
        }
    }

    #[test]
    fn client_errors_and_gateway_timeout_are_not_retryable() {
        for status in [400, 401, 404, 504] {
            assert!(!AppError::remote(status, "x").is_retryable(), "{status}");
        }
    }

    #[test]
    fn local_errors_are_not_retryable() {
        let e = AppError::Sheet {
            message: "bad interval".into(),
        };
        assert!(!e.is_retryable());
    }
}
