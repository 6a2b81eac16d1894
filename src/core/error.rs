//! Purpose: Single error type for every fallible operation in the marshalling layer.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Typed failure channel shared by buffers, decimals, views, holders and registries.
//! Invariants: Failures are surfaced immediately; nothing here retries or coerces.
//! Invariants: Exit-code mapping is stable once published.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    OutOfBounds,
    MalformedEncoding,
    UnboundView,
    InvalidNumericLiteral,
    InvalidScale,
    OutOfRange,
    InvalidType,
    InvalidTimestamp,
    NoServerReachable,
    InvalidCallState,
    Usage,
    Io,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    offset: Option<u64>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            offset: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Failure for a text literal that does not satisfy `grammar`.
    pub(crate) fn literal(kind: ErrorKind, literal: &str, grammar: &str) -> Self {
        Self::new(kind)
            .with_message(format!("cannot parse {literal:?}"))
            .with_hint(format!("expected {grammar}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Io => 3,
        ErrorKind::OutOfBounds => 4,
        ErrorKind::MalformedEncoding => 5,
        ErrorKind::UnboundView => 6,
        ErrorKind::InvalidNumericLiteral => 7,
        ErrorKind::InvalidScale => 8,
        ErrorKind::OutOfRange => 9,
        ErrorKind::InvalidType => 10,
        ErrorKind::InvalidTimestamp => 11,
        ErrorKind::NoServerReachable => 12,
        ErrorKind::InvalidCallState => 13,
    }
}
