use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store entry not found: {0}")]
    NotFound(String),
    #[error("store container is not empty: {0}")]
    NotEmpty(String),
    #[error("invalid store path segment '{segment}' under {path}")]
    InvalidPath { path: String, segment: String },
    #[error("store value '{name}' is not valid UTF-8: {source}")]
    InvalidUtf8 {
        name: String,
        #[source]
        source: FromUtf8Error,
    },
    #[error("store I/O failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
