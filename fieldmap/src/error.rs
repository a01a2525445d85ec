//! Error types for mapping operations.
//!
//! Every failure surfaced by the engine is a [`SerializerError`] carrying an
//! [`ErrorKind`] and a human readable message. The message is the `Display`
//! output, so callers matching on text see exactly what was reported.
//!
//! # Example
//! ```rust
//! use fieldmap::{ErrorKind, SerializerError};
//!
//! let error = SerializerError::deserialization("Cannot decode JSON string provided.");
//! assert_eq!(error.kind(), ErrorKind::Deserialization);
//! assert_eq!(error.to_string(), "Cannot decode JSON string provided.");
//! ```

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Category of a [`SerializerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A type is malformed for mapping: no argument-free constructor, missing
    /// getter/setter, or an unresolved type parameter.
    Configuration,
    /// No handler matches, or a named custom handler is unknown.
    Resolution,
    /// Input data cannot be decoded: bad JSON, dates or enum values.
    Deserialization,
    /// Catch-all for value shapes a handler cannot process.
    Serializer,
}

impl ErrorKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Resolution => "RESOLUTION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Serializer => "SERIALIZER_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by metadata building, handler resolution or (de)serialization.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SerializerError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl SerializerError {
    /// Create a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resolution, message)
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Deserialization, message)
    }

    /// Create a catch-all serializer error.
    pub fn serializer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serializer, message)
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    pub fn is_resolution(&self) -> bool {
        self.kind == ErrorKind::Resolution
    }

    pub fn is_deserialization(&self) -> bool {
        self.kind == ErrorKind::Deserialization
    }
}

/// Result type for mapping operations.
pub type Result<T, E = SerializerError> = std::result::Result<T, E>;
