use crate::cursor::{CursorError, CursorErrorKind};
use std::fmt;

/// An error that aborts decoding a save
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn format(err: FormatError) -> Error {
        Error::new(ErrorKind::UnsupportedFormat(err))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwraps the error into its specific kind
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// A read needed more bytes than the buffer had left. The file is
    /// truncated or corrupt.
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The data is not a save this crate understands
    UnsupportedFormat(FormatError),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::OutOfBounds { offset, .. } => Some(offset),
            ErrorKind::UnsupportedFormat(ref err) => err.offset(),
        }
    }
}

/// Why a buffer was rejected as an unsupported format
#[derive(Debug)]
pub enum FormatError {
    /// Neither the binary magic nor the start of a text save was found
    UnknownMarker,

    /// The binary container declares a version this crate can't read
    ContainerVersion(u16),

    /// An unknown value type code in the binary container
    ValueCode { code: u8, offset: usize },

    /// A varint ran past 10 bytes
    VarintOverflow { offset: usize },

    /// Values were nested deeper than the configured limit
    TooDeep { offset: usize },

    /// The text save could not be parsed, even after repair
    Text(serde_json::Error),

    /// The game version entry is missing or unreadable
    MissingVersion,
}

impl FormatError {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            FormatError::ValueCode { offset, .. } => Some(offset),
            FormatError::VarintOverflow { offset } => Some(offset),
            FormatError::TooDeep { offset } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::UnsupportedFormat(FormatError::Text(ref err)) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::OutOfBounds {
                offset,
                needed,
                remaining,
            } => write!(
                f,
                "unexpected end of file: needed {} bytes at offset {} but only {} remain",
                needed, offset, remaining
            ),
            ErrorKind::UnsupportedFormat(ref err) => write!(f, "unsupported format: {}", err),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FormatError::UnknownMarker => write!(f, "not a recognized save file"),
            FormatError::ContainerVersion(v) => write!(f, "container version {} not supported", v),
            FormatError::ValueCode { code, offset } => {
                write!(f, "unknown value code 0x{:02x} (offset: {})", code, offset)
            }
            FormatError::VarintOverflow { offset } => {
                write!(f, "varint longer than 10 bytes (offset: {})", offset)
            }
            FormatError::TooDeep { offset } => {
                write!(f, "values nested too deeply (offset: {})", offset)
            }
            FormatError::Text(ref err) => write!(f, "malformed text save: {}", err),
            FormatError::MissingVersion => write!(f, "game version entry is missing"),
        }
    }
}

impl From<CursorError> for Error {
    fn from(error: CursorError) -> Self {
        let offset = error.position();
        match *error.kind() {
            CursorErrorKind::Eof { needed, remaining } => Error::new(ErrorKind::OutOfBounds {
                offset,
                needed,
                remaining,
            }),
            CursorErrorKind::VarintOverflow => {
                Error::format(FormatError::VarintOverflow { offset })
            }
        }
    }
}

impl From<FormatError> for Error {
    fn from(error: FormatError) -> Self {
        Error::format(error)
    }
}

/// A field that could not be decoded and was given its default instead.
///
/// Skipped fields never abort a decode. They are collected so callers can
/// tell a defaulted value from a genuine zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    path: String,
    reason: SkipReason,
}

impl SkippedField {
    pub(crate) fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        SkippedField {
            path: path.into(),
            reason,
        }
    }

    /// Dotted location of the field, starting at the top level entry key
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn reason(&self) -> &SkipReason {
        &self.reason
    }
}

/// Why a field was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The field was not present in the record
    Missing,

    /// The field held a value of another shape
    Mistyped { expected: &'static str },

    /// A record had a tag other than the one its position requires
    UnexpectedTag { expected: &'static str, found: String },
}

impl fmt::Display for SkippedField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.reason {
            SkipReason::Missing => write!(f, "{}: missing", self.path),
            SkipReason::Mistyped { expected } => {
                write!(f, "{}: expected {}", self.path, expected)
            }
            SkipReason::UnexpectedTag {
                expected,
                ref found,
            } => write!(f, "{}: expected {} record, found {}", self.path, expected, found),
        }
    }
}
