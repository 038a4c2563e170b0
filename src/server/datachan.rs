//! Contains code pertaining to the FTP *data* channel: establishing the
//! one-shot connection a PORT/EPRT/PASV/EPSV negotiation promised, and
//! running a single transfer over it.

use super::{
    chancomms::{ControlChanMsg, DataChanCmd},
    controlchan::{handler::CommandContext, Reply, ReplyCode},
    tls::FtpsConfig,
    AsyncStream,
};
use crate::{
    auth::UserDetail,
    storage::{Error, ErrorKind, FileSystem, Fileinfo, Metadata, Perm},
};
use chrono::{DateTime, Local};
use std::{
    io,
    net::SocketAddr,
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::mpsc::Sender,
};
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

// How long a passive listener waits for the client to show up.
const DATA_ACCEPT_TIMEOUT: Duration = Duration::from_secs(15);

// The data endpoint a PORT/EPRT/PASV/EPSV negotiation left behind. It is a
// single-shot value: the next data-bearing command moves it out of the
// session, so "used exactly once and cleared even on error" holds by
// construction.
#[derive(Debug)]
pub enum DataEndpoint {
    // Active mode: we dial the address the client advertised.
    Active(SocketAddr),
    // Passive mode: the client dials us; we accept exactly one connection.
    Passive(TcpListener),
}

impl DataEndpoint {
    async fn establish(self) -> io::Result<TcpStream> {
        match self {
            DataEndpoint::Active(addr) => TcpStream::connect(addr).await,
            DataEndpoint::Passive(listener) => {
                let (socket, _remote) = tokio::time::timeout(DATA_ACCEPT_TIMEOUT, listener.accept())
                    .await
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "client did not connect to the data port in time"))??;
                Ok(socket)
            }
        }
    }
}

// Consumes the session's pending data endpoint and runs `cmd` over it in a
// new task. Returns the reply the calling handler should send; `150` means
// the transfer is on its way and the terminal reply will follow via the
// control message channel.
pub(crate) async fn spawn_transfer<S, U>(args: &CommandContext<S, U>, cmd: DataChanCmd) -> Reply
where
    S: FileSystem + 'static,
    U: UserDetail + 'static,
{
    let mut session = args.session.lock().await;
    let is_retr = matches!(cmd, DataChanCmd::Retr { .. });
    let endpoint = match session.data_endpoint.take() {
        Some(endpoint) => endpoint,
        None => {
            // A refused RETR attempt still consumes a pending REST offset.
            // Other data-bearing commands leave it for the next RETR.
            if is_retr {
                session.rest_offset = 0;
            }
            return Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established");
        }
    };
    slog::debug!(args.logger, "Starting transfer {:?}", cmd; "type" => ?session.transfer_type);

    let abort = CancellationToken::new();
    session.data_abort = Some(abort.clone());
    session.data_busy = true;

    let transfer = Transfer {
        logger: args.logger.new(slog::o!("channel" => "data")),
        fs: Arc::clone(&session.fs),
        perm: Arc::clone(&args.perm),
        control_msg_tx: session.control_msg_tx.clone(),
        rest_offset: session.rest_offset,
        tls: match (&session.ftps_config, session.data_tls) {
            (FtpsConfig::On { tls_config }, true) => Some(Arc::clone(tls_config)),
            _ => None,
        },
        abort,
    };
    // Only a RETR consumes the offset, and it does so the moment the attempt
    // starts, whatever its outcome.
    if is_retr {
        session.rest_offset = 0;
    }
    drop(session);

    tokio::spawn(transfer.run(cmd, endpoint));

    Reply::new(ReplyCode::FileStatusOkay, "Data transfer starting")
}

// Executes one transfer over an established data connection and reports the
// outcome to the control loop.
struct Transfer<S>
where
    S: FileSystem + 'static,
{
    logger: slog::Logger,
    fs: Arc<S>,
    perm: Arc<dyn Perm>,
    control_msg_tx: Sender<ControlChanMsg>,
    rest_offset: u64,
    tls: Option<Arc<rustls::ServerConfig>>,
    abort: CancellationToken,
}

impl<S> Transfer<S>
where
    S: FileSystem + 'static,
{
    async fn run(self, cmd: DataChanCmd, endpoint: DataEndpoint) {
        let aborted = tokio::select! {
            _ = self.abort.cancelled() => true,
            _ = self.perform(&cmd, endpoint) => false,
        };
        if aborted {
            slog::info!(self.logger, "Transfer aborted: {:?}", cmd);
            self.send(ControlChanMsg::TransferAborted).await;
            self.send(abor_ack()).await;
        } else if self.abort.is_cancelled() {
            // The transfer finished in the same instant ABOR came in; the
            // client still gets the acknowledgement it is waiting for.
            self.send(abor_ack()).await;
        }
    }

    async fn perform(&self, cmd: &DataChanCmd, endpoint: DataEndpoint) {
        let socket = match endpoint.establish().await {
            Ok(socket) => socket,
            Err(err) => {
                slog::warn!(self.logger, "Could not establish data connection: {}", err);
                self.send(ControlChanMsg::DataConnectionFailed).await;
                return;
            }
        };

        let mut stream: Box<dyn AsyncStream> = match &self.tls {
            Some(config) => {
                let acceptor: TlsAcceptor = Arc::clone(config).into();
                match acceptor.accept(socket).await {
                    Ok(tls_stream) => Box::new(tls_stream),
                    Err(err) => {
                        slog::warn!(self.logger, "TLS handshake on data connection failed: {}", err);
                        self.send(ControlChanMsg::DataConnectionFailed).await;
                        return;
                    }
                }
            }
            None => Box::new(socket),
        };

        match cmd {
            DataChanCmd::Retr { path } => self.exec_retr(path, &mut stream).await,
            DataChanCmd::Stor { path, append } => self.exec_stor(path, *append, &mut stream).await,
            DataChanCmd::List { path } => self.exec_list(path, &mut stream).await,
            DataChanCmd::Nlst { path } => self.exec_nlst(path, &mut stream).await,
        }
    }

    async fn exec_retr(&self, path: &str, output: &mut Box<dyn AsyncStream>) {
        match self.fs.get_file(Path::new(path), self.rest_offset).await {
            Ok((_size, mut reader)) => match tokio::io::copy(&mut reader, output).await {
                Ok(bytes) => {
                    if let Err(err) = output.shutdown().await {
                        slog::warn!(self.logger, "Could not shutdown data stream after RETR: {}", err);
                    }
                    self.send(ControlChanMsg::SentData { bytes }).await;
                }
                Err(err) => {
                    slog::warn!(self.logger, "Error copying to data stream during RETR: {}", err);
                    self.send(ControlChanMsg::StorageError(Error::new(ErrorKind::LocalError, err))).await;
                }
            },
            Err(err) => self.send(ControlChanMsg::StorageError(err)).await,
        }
    }

    async fn exec_stor(&self, path: &str, append: bool, input: &mut Box<dyn AsyncStream>) {
        match self.fs.put_file(Path::new(path), input, append).await {
            Ok(bytes) => self.send(ControlChanMsg::WrittenData { bytes }).await,
            Err(err) => self.send(ControlChanMsg::StorageError(err)).await,
        }
    }

    async fn exec_list(&self, path: &str, output: &mut Box<dyn AsyncStream>) {
        match self.render_listing(path).await {
            Ok(text) => match output.write_all(text.as_bytes()).await {
                Ok(()) => {
                    if let Err(err) = output.shutdown().await {
                        slog::warn!(self.logger, "Could not shutdown data stream after LIST: {}", err);
                    }
                    self.send(ControlChanMsg::DirectoryListed).await;
                }
                Err(err) => {
                    slog::warn!(self.logger, "Error writing to data stream during LIST: {}", err);
                    self.send(ControlChanMsg::StorageError(Error::new(ErrorKind::LocalError, err))).await;
                }
            },
            Err(err) => self.send(ControlChanMsg::StorageError(err)).await,
        }
    }

    async fn exec_nlst(&self, path: &str, output: &mut Box<dyn AsyncStream>) {
        match self.fs.list_dir(Path::new(path)).await {
            Ok(entries) => {
                let mut text = String::new();
                for entry in &entries {
                    text.push_str(&format!("{}\r\n", entry.path.display()));
                }
                match output.write_all(text.as_bytes()).await {
                    Ok(()) => {
                        if let Err(err) = output.shutdown().await {
                            slog::warn!(self.logger, "Could not shutdown data stream after NLST: {}", err);
                        }
                        self.send(ControlChanMsg::DirectoryListed).await;
                    }
                    Err(err) => {
                        slog::warn!(self.logger, "Error writing to data stream during NLST: {}", err);
                        self.send(ControlChanMsg::StorageError(Error::new(ErrorKind::LocalError, err))).await;
                    }
                }
            }
            Err(err) => self.send(ControlChanMsg::StorageError(err)).await,
        }
    }

    async fn render_listing(&self, path: &str) -> Result<String, Error> {
        let entries = self.fs.list_dir(Path::new(path)).await?;
        let mut text = String::new();
        for entry in &entries {
            let full = Path::new(path).join(&entry.path);
            let mode = self.perm.mode(&full)?;
            let owner = self.perm.owner(&full)?;
            let group = self.perm.group(&full)?;
            text.push_str(&format_list_line(entry, mode, &owner, &group));
        }
        Ok(text)
    }

    async fn send(&self, msg: ControlChanMsg) {
        if let Err(err) = self.control_msg_tx.send(msg).await {
            slog::error!(self.logger, "Could not notify control channel: {}", err);
        }
    }
}

fn abor_ack() -> ControlChanMsg {
    ControlChanMsg::CommandChannelReply(Reply::new(ReplyCode::ClosingDataConnection, "ABOR command successful"))
}

// One line of `LIST` output in the BSD ls -l convention:
// mode, a link count of 1, owner, group, size, date and name.
fn format_list_line<M: Metadata>(file: &Fileinfo<M>, mode: u32, owner: &str, group: &str) -> String {
    let file_type = if file.metadata.is_dir() {
        'd'
    } else if file.metadata.is_symlink() {
        'l'
    } else {
        '-'
    };
    let modified = file
        .metadata
        .modified()
        .map(format_list_date)
        .unwrap_or_else(|_| "            ".to_string());
    format!(
        "{}{} 1 {:<8} {:<8} {:>12} {} {}\r\n",
        file_type,
        mode_string(mode),
        owner,
        group,
        file.metadata.len(),
        modified,
        file.path.display()
    )
}

// Entries touched within the last six months show hour and minute, older
// ones the year, like ls does. Server-local time.
fn format_list_date(modified: SystemTime) -> String {
    let modified: DateTime<Local> = modified.into();
    if Local::now().signed_duration_since(modified) < chrono::Duration::days(183) {
        modified.format("%b %d %H:%M").to_string()
    } else {
        modified.format("%b %d  %Y").to_string()
    }
}

// Renders the 9 permission bits as rwxrwxrwx.
fn mode_string(mode: u32) -> String {
    let mut out = String::with_capacity(9);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    struct FakeMeta {
        len: u64,
        dir: bool,
    }

    impl Metadata for FakeMeta {
        fn len(&self) -> u64 {
            self.len
        }
        fn is_dir(&self) -> bool {
            self.dir
        }
        fn is_file(&self) -> bool {
            !self.dir
        }
        fn is_symlink(&self) -> bool {
            false
        }
        fn modified(&self) -> crate::storage::Result<SystemTime> {
            Ok(SystemTime::now())
        }
    }

    #[test]
    fn mode_string_renders_each_triplet() {
        assert_eq!(mode_string(0o644), "rw-r--r--");
        assert_eq!(mode_string(0o755), "rwxr-xr-x");
        assert_eq!(mode_string(0o000), "---------");
        assert_eq!(mode_string(0o777), "rwxrwxrwx");
    }

    #[test]
    fn list_line_has_the_ls_shape() {
        let file = Fileinfo {
            path: PathBuf::from("hello.txt"),
            metadata: FakeMeta { len: 1234, dir: false },
        };
        let line = format_list_line(&file, 0o644, "ftp", "ftp");
        assert!(line.starts_with("-rw-r--r-- 1 ftp"), "unexpected line: {}", line);
        assert!(line.contains(" 1234 "));
        assert!(line.ends_with("hello.txt\r\n"));
    }

    #[test]
    fn directories_get_the_d_type_char() {
        let dir = Fileinfo {
            path: PathBuf::from("sub"),
            metadata: FakeMeta { len: 0, dir: true },
        };
        let line = format_list_line(&dir, 0o755, "ftp", "ftp");
        assert!(line.starts_with("drwxr-xr-x 1 "), "unexpected line: {}", line);
    }

    #[test]
    fn recent_dates_show_the_clock() {
        let now = SystemTime::now();
        let formatted = format_list_date(now);
        assert!(formatted.contains(':'), "expected HH:MM in {}", formatted);
    }
}
