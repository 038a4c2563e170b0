//! Contains the messages flowing between the control loop and the data
//! channel tasks.

use crate::server::controlchan::Reply;
use crate::storage;
use std::fmt;

// Work the control channel hands to a freshly consumed data endpoint. Paths
// are absolute virtual paths, already resolved against the session cwd.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum DataChanCmd {
    Retr {
        path: String,
    },
    Stor {
        path: String,
        /// Append instead of truncate; also carries APPE and STOU.
        append: bool,
    },
    List {
        path: String,
    },
    Nlst {
        path: String,
    },
}

/// Messages that can be sent to the control channel loop.
#[derive(Debug)]
pub enum ControlChanMsg {
    /// Data was successfully sent to the client during a RETR.
    SentData {
        /// The number of bytes transferred.
        bytes: u64,
    },
    /// We've written the data from the client to the `FileSystem`.
    WrittenData {
        /// The number of bytes transferred.
        bytes: u64,
    },
    /// Listed the directory successfully.
    DirectoryListed,
    /// The data connection could not be established.
    DataConnectionFailed,
    /// The in-flight transfer was torn down by ABOR.
    TransferAborted,
    /// Errors coming from the `FileSystem` driver.
    StorageError(storage::Error),
    /// Reply verbatim on the command channel.
    CommandChannelReply(Reply),
    /// Sent to switch the control channel to TLS mode.
    SecureControlChannel,
    /// Quit the client connection.
    ExitControlLoop,
}

impl fmt::Display for ControlChanMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
