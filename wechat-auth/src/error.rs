//! Error types for the `wechat-auth` crate.
//!
//! A root `Error` struct carries an error kind tree plus an optional source
//! for chaining, mirroring the error layout used across the workspace.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for wechat-auth.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in wechat-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Storage(StorageErrorKind),
    Remote(RemoteErrorKind),
    Http(HttpErrorKind),
    Config(ConfigErrorKind),
}

/// Errors from the on-disk credential store.
///
/// Every kind except `Io` on a write is treated by the resolver as a cache miss.
#[derive(Debug, PartialEq)]
pub enum StorageErrorKind {
    /// The credential file does not exist.
    NotFound,
    /// The credential file exists but holds only whitespace.
    EmptyFile,
    /// The content is not valid JSON.
    Parse,
    /// Valid JSON, but a required field is absent, mistyped, empty or zero.
    MissingField,
    /// Underlying filesystem failure.
    Io,
}

/// Errors from the remote platform.
#[derive(Debug, PartialEq)]
pub enum RemoteErrorKind {
    /// The platform answered with a non-success HTTP status.
    Status(u16),
    /// The body did not decode into the expected credential shape.
    InvalidResponse,
    /// The request never produced a response (connect, timeout, TLS).
    Network,
}

/// Errors from building the HTTP client.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
}

/// Errors from assembling the server configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    MissingValue,
    WorkingDirectory,
}

impl Error {
    /// True when the error is the store reporting an absent credential file.
    pub fn is_not_found(&self) -> bool {
        self.error_kind == ErrorKind::Storage(StorageErrorKind::NotFound)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Storage(kind) => write!(f, "Storage error: {:?}", kind)?,
            ErrorKind::Remote(kind) => write!(f, "Remote error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
            ErrorKind::Config(kind) => write!(f, "Config error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Builder errors happen before any network call is made.
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_decode() {
            ErrorKind::Remote(RemoteErrorKind::InvalidResponse)
        } else if let Some(status) = err.status() {
            ErrorKind::Remote(RemoteErrorKind::Status(status.as_u16()))
        } else {
            ErrorKind::Remote(RemoteErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create storage errors.
pub fn storage_error(kind: StorageErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Storage(kind),
    }
}

/// Helper function to create storage errors that wrap an I/O failure.
pub fn io_error(err: std::io::Error) -> Error {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        StorageErrorKind::NotFound
    } else {
        StorageErrorKind::Io
    };
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(kind),
    }
}

/// Helper function to create remote errors.
pub fn remote_error(kind: RemoteErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Remote(kind),
    }
}

/// Helper function to create config errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}
