//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("metrics encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
