//! Error types for linexml

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }

    /// Resolve a byte offset into a line/column position within `input`.
    ///
    /// Offsets past the end of the input are clamped to the end.
    pub fn locate(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = input.get(..offset).unwrap_or(input);
        let line = before.matches('\n').count().saturating_add(1);
        let line_start = before.rfind('\n').map_or(0, |nl| nl.saturating_add(1));
        let col = before
            .get(line_start..)
            .map_or(0, |s| s.chars().count())
            .saturating_add(1);
        Self::new(
            offset,
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(col).unwrap_or(u32::MAX),
        )
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file could not be read into a buffer
    FileUnavailable,
    /// Nothing to parse after the declaration and blank lines
    EmptyInput,
    /// A tag could not be understood
    MalformedTag,
    /// An element was opened but the input ended before its closing tag
    UnexpectedEndOfInput,
    /// Byte input was not valid UTF-8
    InvalidUtf8,
    MaxDepthExceeded { max: usize },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileUnavailable => write!(f, "file unavailable"),
            Self::EmptyInput => write!(f, "empty input"),
            Self::MalformedTag => write!(f, "malformed tag"),
            Self::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for linexml
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("error at {pos}: {message}")]
pub struct Error {
    kind: ErrorKind,
    pos: Pos,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, pos: Pos) -> Self {
        let message = kind.to_string();
        Self { kind, pos, message }
    }

    pub fn with_message(kind: ErrorKind, pos: Pos, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            message: message.into(),
        }
    }

    /// Create an error located at a byte offset of `input`
    pub fn at(kind: ErrorKind, input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::with_message(kind, Pos::locate(input, offset), message)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type alias for linexml
pub type Result<T> = std::result::Result<T, Error>;
