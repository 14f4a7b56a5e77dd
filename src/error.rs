//! Defines [`GeodexError`], representing all errors returned by this crate.

use std::borrow::Cow;
use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeodexError {
    /// An allocation could not be satisfied.
    #[error("Out of memory")]
    OutOfMemory,

    /// A precondition on a constructor or mutator was violated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// Malformed input to a codec reader.
    ///
    /// `offset` is the byte offset into the input at which the problem was detected.
    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A writer was asked to emit a geometry kind the target format cannot express.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(Cow<'static, str>),

    /// A geohash input coordinate lies outside the configured domain.
    #[error("Coordinate {value} outside of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// A table cell was accessed through an accessor of the wrong type.
    #[error("Column {column} has type '{found}', expected {expected}")]
    ColumnTypeMismatch {
        column: usize,
        expected: Cow<'static, str>,
        found: char,
    },

    /// A row, column or index does not exist.
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

/// Stable classification of a [`GeodexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfMemory,
    InvalidArgument,
    ParseError,
    UnsupportedGeometry,
    OutOfRange,
    ColumnTypeMismatch,
    NotFound,
    Io,
}

impl GeodexError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(message.into())
    }

    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Parse { .. } | Self::SerdeJsonError(_) => ErrorKind::ParseError,
            Self::UnsupportedGeometry(_) => ErrorKind::UnsupportedGeometry,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::ColumnTypeMismatch { .. } => ErrorKind::ColumnTypeMismatch,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IOError(_) => ErrorKind::Io,
        }
    }
}

impl From<std::collections::TryReserveError> for GeodexError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeodexError>;
