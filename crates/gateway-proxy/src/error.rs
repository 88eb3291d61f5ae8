//! Proxy error types

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("upstream connection failed: {0}")]
    Unavailable(reqwest::Error),

    #[error("upstream request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("upstream returned error: {status} - {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Classify a transport-level failure into the proxy error taxonomy.
///
/// This is the single place where reqwest errors are interpreted; the
/// HTTP status mapping on top of these variants lives in the API crate.
pub(crate) fn classify(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        return ProxyError::Timeout(err);
    }
    if err.is_decode() {
        return ProxyError::InvalidResponse(err.to_string());
    }
    if err.is_connect() || has_connection_io_error(&err) {
        return ProxyError::Unavailable(err);
    }
    ProxyError::Transport(err)
}

/// Walk the error source chain looking for a refused/reset/aborted socket.
///
/// reqwest only marks failures during connection establishment with
/// `is_connect()`; a peer resetting an in-flight request surfaces as a
/// generic request error with an io error buried in the chain.
fn has_connection_io_error(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = ProxyError::UpstreamStatus {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned error: 503 - overloaded");

        let err = ProxyError::InvalidUrl("not-a-url".to_string());
        assert!(err.to_string().contains("not-a-url"));
    }
}
