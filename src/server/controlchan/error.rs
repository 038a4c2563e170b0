//! Contains the `ControlChanError` struct that defines the control channel
//! error type.

use super::parse_error::ParseError;
use thiserror::Error;

/// The error type produced on the control channel.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A list specifying categories of control channel errors.
#[derive(Eq, PartialEq, Debug, Error)]
#[allow(dead_code)]
pub enum ControlChanErrorKind {
    /// We encountered a system IO error.
    #[error("failed to perform IO")]
    IoError,
    /// We encountered a non-UTF8 character in the command.
    #[error("non-UTF8 character in command")]
    Utf8Error,
    /// The client issued a command we don't know about.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The command that we don't know about.
        command: String,
    },
    /// The client issued a command that we know about, but in an invalid way
    /// (e.g. `USER` without a username).
    #[error("invalid command (invalid parameter)")]
    InvalidCommand,
    /// A control line exceeded the line-length limit without a terminator.
    #[error("command line too long")]
    CommandLineTooLong,
    /// The timer on the control channel elapsed.
    #[error("encountered read timeout on the control channel")]
    ControlChannelTimeout,
    /// The control channel is out of sync, e.g. a data-bearing command showed
    /// up in a state the dispatcher can't serve it from.
    #[error("control channel in illegal state")]
    IllegalState,
    /// Internal server error. This is probably a bug.
    #[error("internal server error")]
    InternalServerError,
}

impl ControlChanError {
    /// Creates a new control channel error with the specific kind
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    /// Return the inner error kind of this error.
    pub fn kind(&self) -> &ControlChanErrorKind {
        &self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError { kind, source: None }
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::IoError,
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Utf8Error,
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseError> for ControlChanError {
    fn from(err: ParseError) -> ControlChanError {
        let kind = match &err {
            ParseError::UnknownCommand { command } => ControlChanErrorKind::UnknownCommand { command: command.clone() },
            ParseError::InvalidUtf8 => ControlChanErrorKind::Utf8Error,
            ParseError::InvalidCommand => ControlChanErrorKind::InvalidCommand,
        };
        ControlChanError {
            kind,
            source: Some(Box::new(err)),
        }
    }
}
