use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// The error produced when a control line cannot be turned into a [`Command`].
///
/// [`Command`]: super::command::Command
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The client issued a verb we don't know about.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The verb that we don't know about.
        command: String,
    },
    /// A known verb with an invalid argument (e.g. `USER` without a name).
    #[error("invalid command (invalid parameter)")]
    InvalidCommand,
    /// We encountered a non-UTF8 character in the command.
    #[error("non-UTF8 character in command")]
    InvalidUtf8,
}
