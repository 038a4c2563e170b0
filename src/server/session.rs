//! The session module implements the per-connection mutable state that the
//! command handlers and the data channel read and write.

use super::{chancomms::ControlChanMsg, datachan::DataEndpoint, tls::FtpsConfig};
use crate::{auth::UserDetail, storage::FileSystem};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::{
    fmt::{self, Formatter},
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

// An opaque identifier, stable for the lifetime of the connection. Used to
// correlate log statements and handed to the driver's init hook.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SessionId(String);

const SESSION_ID_LEN: usize = 20;

impl SessionId {
    pub fn new() -> Self {
        let id = thread_rng().sample_iter(&Alphanumeric).take(SESSION_ID_LEN).map(char::from).collect();
        SessionId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SessionState {
    New,
    WaitPass,
    WaitCmd,
}

// The data representation negotiated with TYPE. Tracked and echoed; transfers
// are byte-exact in both representations.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TransferType {
    Ascii,
    Image,
}

// The session shared via an asynchronous lock
pub type SharedSession<S, U> = Arc<tokio::sync::Mutex<Session<S, U>>>;

// This is where we keep the state for an FTP session.
#[derive(Debug)]
pub struct Session<S, U>
where
    S: FileSystem,
    U: UserDetail,
{
    pub id: SessionId,
    pub fs: Arc<S>,
    // Account details, present once logged in.
    pub user: Arc<Option<U>>,
    // The username staged by USER; confirmed by PASS.
    pub username: Option<String>,
    pub state: SessionState,
    pub source: SocketAddr,
    // Current working directory as a virtual absolute path.
    pub cwd: PathBuf,
    pub transfer_type: TransferType,
    // Byte offset for the next RETR, set by REST. Consumed by the next RETR
    // attempt, success or failure.
    pub rest_offset: u64,
    // After a RNFR command this holds the source path for RNTO. Any other
    // command clears it again.
    pub rename_from: Option<PathBuf>,
    // The pending data endpoint negotiated by PORT/EPRT/PASV/EPSV. Moved out
    // by exactly one data-bearing command.
    pub data_endpoint: Option<DataEndpoint>,
    // Cancels the in-flight transfer, if any. Taken by ABOR.
    pub data_abort: Option<CancellationToken>,
    // Keeps the idle timer from killing the session mid-transfer.
    pub data_busy: bool,
    // Set by EPSV ALL; PORT/PASV/EPRT are refused afterwards.
    pub epsv_all: bool,
    // True if the control channel is in TLS mode at the moment.
    pub cmd_tls: bool,
    // True if the data channel is to be wrapped in TLS. Changed by PROT.
    pub data_tls: bool,
    // PROT P requires a preceding PBSZ 0.
    pub pbsz_done: bool,
    // Tells if TLS is available to this session at all. cmd_tls and data_tls
    // tell whether the channels are actually encrypted right now.
    pub ftps_config: FtpsConfig,
    // Handlers and data tasks use this to get replies onto the control
    // channel out of band.
    pub control_msg_tx: Sender<ControlChanMsg>,
}

impl<S, U> Session<S, U>
where
    S: FileSystem + 'static,
    U: UserDetail,
{
    pub(super) fn new(fs: Arc<S>, source: SocketAddr, control_msg_tx: Sender<ControlChanMsg>) -> Self {
        Session {
            id: SessionId::new(),
            fs,
            user: Arc::new(None),
            username: None,
            state: SessionState::New,
            source,
            cwd: "/".into(),
            transfer_type: TransferType::Ascii,
            rest_offset: 0,
            rename_from: None,
            data_endpoint: None,
            data_abort: None,
            data_busy: false,
            epsv_all: false,
            cmd_tls: false,
            data_tls: false,
            pbsz_done: false,
            ftps_config: FtpsConfig::Off,
            control_msg_tx,
        }
    }

    pub fn ftps(mut self, config: FtpsConfig) -> Self {
        self.ftps_config = config;
        self
    }

    pub fn cmd_tls(mut self, on: bool) -> Self {
        self.cmd_tls = on;
        self
    }

    /// Resolves a client-supplied path against the working directory into an
    /// absolute virtual path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        resolve_virtual(&self.cwd, path)
    }

    // REIN: back to the just-connected state. The driver binding and the
    // control channel's TLS state survive.
    pub fn reinitialize(&mut self) {
        self.user = Arc::new(None);
        self.username = None;
        self.state = SessionState::New;
        self.cwd = "/".into();
        self.transfer_type = TransferType::Ascii;
        self.rest_offset = 0;
        self.rename_from = None;
        self.data_endpoint = None;
        if let Some(token) = self.data_abort.take() {
            token.cancel();
        }
        self.data_busy = false;
        self.epsv_all = false;
        self.data_tls = false;
        self.pbsz_done = false;
    }
}

// Joins `path` onto `cwd` (absolute paths replace it) and resolves `.` and
// `..` lexically. The result never climbs above the virtual root.
pub(crate) fn resolve_virtual(cwd: &Path, path: &str) -> PathBuf {
    let joined = if path.starts_with('/') { PathBuf::from(path) } else { cwd.join(path) };
    let mut resolved = PathBuf::from("/");
    for component in joined.components() {
        match component {
            Component::Normal(p) => resolved.push(p),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::resolve_virtual;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn resolve_relative_and_absolute() {
        let cwd = Path::new("/foo/bar");
        assert_eq!(resolve_virtual(cwd, "baz.txt"), PathBuf::from("/foo/bar/baz.txt"));
        assert_eq!(resolve_virtual(cwd, "/baz.txt"), PathBuf::from("/baz.txt"));
        assert_eq!(resolve_virtual(cwd, "a/b"), PathBuf::from("/foo/bar/a/b"));
    }

    #[test]
    fn resolve_dot_and_dotdot() {
        let cwd = Path::new("/foo/bar");
        assert_eq!(resolve_virtual(cwd, ".."), PathBuf::from("/foo"));
        assert_eq!(resolve_virtual(cwd, "../.."), PathBuf::from("/"));
        assert_eq!(resolve_virtual(cwd, "../../.."), PathBuf::from("/"));
        assert_eq!(resolve_virtual(cwd, "./x/../y"), PathBuf::from("/foo/bar/y"));
    }

    #[test]
    fn session_ids_are_opaque_and_fixed_length() {
        let a = super::SessionId::new();
        let b = super::SessionId::new();
        assert_eq!(a.as_str().len(), 20);
        assert_ne!(a, b);
    }
}
