use super::{
    auth::AuthMiddleware,
    codec::FtpCodec,
    command::Command,
    commands,
    error::{ControlChanError, ControlChanErrorKind},
    event::Event,
    handler::{CommandContext, CommandHandler},
    log::LoggingMiddleware,
    middleware::ControlChanMiddleware,
    Reply, ReplyCode,
};
use crate::{
    auth::{Authenticator, UserDetail},
    server::{
        chancomms::ControlChanMsg,
        ftpserver::options::PassiveHost,
        session::{Session, SharedSession},
        tls::FtpsConfig,
        AsyncStream,
    },
    storage::{self, FileSystem, Perm},
};
use futures_util::{SinkExt, StreamExt};
use std::{net::SocketAddr, ops::RangeInclusive, sync::Arc, time::Duration};
use tokio::sync::{
    mpsc::{channel, Receiver, Sender},
    Mutex,
};
use tokio_rustls::TlsAcceptor;
use tokio_util::codec::Decoder;

// Everything one control connection needs to run, regardless of how its
// socket came to be (plain, implicit TLS or upgraded later).
pub(crate) struct LoopConfig<User>
where
    User: UserDetail,
{
    pub authenticator: Arc<dyn Authenticator<User>>,
    pub perm: Arc<dyn Perm>,
    pub greeting: String,
    pub passive_ports: RangeInclusive<u16>,
    pub passive_host: PassiveHost,
    pub ftps_config: FtpsConfig,
    pub idle_session_timeout: Duration,
    pub logger: slog::Logger,
}

// Does the control channel processing for one FTP client: greets, then runs
// the read -> parse -> dispatch -> reply loop in a task of its own.
pub(crate) async fn spawn_loop<Storage, User>(
    config: LoopConfig<User>,
    stream: Box<dyn AsyncStream>,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    tls_on_control: bool,
    fs: Storage,
) -> Result<(), ControlChanError>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    let LoopConfig {
        authenticator,
        perm,
        greeting,
        passive_ports,
        passive_host,
        ftps_config,
        idle_session_timeout,
        logger,
    } = config;

    let tls_configured = ftps_config.is_on();
    let (control_msg_tx, mut control_msg_rx): (Sender<ControlChanMsg>, Receiver<ControlChanMsg>) = channel(8);

    let session: Session<Storage, User> = Session::new(Arc::new(fs), peer_addr, control_msg_tx.clone())
        .ftps(ftps_config.clone())
        .cmd_tls(tls_on_control);
    let logger = logger.new(slog::o!("session-id" => session.id.to_string(), "source" => session.source.to_string()));
    session.fs.init(session.id.as_str()).await;
    let shared_session: SharedSession<Storage, User> = Arc::new(Mutex::new(session));

    let event_chain = PrimaryEventHandler {
        logger: logger.clone(),
        session: Arc::clone(&shared_session),
        authenticator,
        perm,
        tls_configured,
        passive_ports,
        passive_host,
        tx_control_chan: control_msg_tx,
        local_addr,
    };
    let event_chain = AuthMiddleware {
        session: Arc::clone(&shared_session),
        next: event_chain,
    };
    let mut event_chain = LoggingMiddleware {
        logger: logger.clone(),
        sequence_nr: 0,
        next: event_chain,
    };

    let framed = FtpCodec::new().framed(stream);
    let (mut reply_sink, mut command_source) = framed.split();

    reply_sink.send(Reply::new_with_string(ReplyCode::ServiceReady, greeting)).await?;
    reply_sink.flush().await?;

    tokio::spawn(async move {
        slog::info!(logger, "Starting control loop");
        loop {
            let incoming = {
                let mut timeout_delay = Box::pin(tokio::time::sleep(idle_session_timeout));
                // Internal messages first: a finished transfer must settle
                // (and free its abort token) before the next command is read.
                tokio::select! {
                    biased;
                    Some(msg) = control_msg_rx.recv() => Some(Ok(Event::InternalMsg(msg))),
                    cmd_result = command_source.next() => match cmd_result {
                        Some(result) => Some(result.map(Event::Command)),
                        None => {
                            slog::info!(logger, "Control connection closed by peer");
                            return;
                        }
                    },
                    _ = &mut timeout_delay => {
                        let session = shared_session.lock().await;
                        match session.data_busy {
                            true => None,
                            false => Some(Err(ControlChanError::new(ControlChanErrorKind::ControlChannelTimeout))),
                        }
                    }
                }
            };
            match incoming {
                None => {} // A transfer is in flight; not idle. Loop again.
                Some(Ok(Event::InternalMsg(ControlChanMsg::ExitControlLoop))) => {
                    slog::info!(logger, "Exiting control loop");
                    return;
                }
                Some(Ok(event)) => {
                    if let Event::InternalMsg(ControlChanMsg::SecureControlChannel) = event {
                        slog::info!(logger, "Upgrading control channel to TLS");

                        // Get back the original stream from the codec
                        let framed = match reply_sink.reunite(command_source) {
                            Ok(framed) => framed,
                            Err(_) => return,
                        };
                        let io = framed.into_inner();

                        let acceptor: TlsAcceptor = match &ftps_config {
                            FtpsConfig::On { tls_config } => Arc::clone(tls_config).into(),
                            FtpsConfig::Off => {
                                slog::error!(logger, "TLS upgrade requested but TLS is not configured");
                                return;
                            }
                        };
                        let io: Box<dyn AsyncStream> = match acceptor.accept(io).await {
                            Ok(tls_stream) => Box::new(tls_stream),
                            Err(err) => {
                                slog::warn!(logger, "Closing control channel. Could not upgrade to TLS: {}", err);
                                return;
                            }
                        };

                        // Wrap in the codec again and get sink + source
                        let framed = FtpCodec::new().framed(io);
                        let (sink, source) = framed.split();
                        reply_sink = sink;
                        command_source = source;
                    }

                    match event_chain.handle(event).await {
                        Err(err) => {
                            slog::warn!(logger, "Event handler chain error: {:?}. Closing control connection", err);
                            return;
                        }
                        Ok(reply) => {
                            if reply_sink.send(reply).await.is_err() {
                                slog::warn!(logger, "Could not send reply to client");
                                return;
                            }
                        }
                    }
                }
                Some(Err(error)) => {
                    let (reply, close_connection) = handle_control_channel_error(&logger, error);
                    if reply_sink.send(reply).await.is_err() {
                        slog::warn!(logger, "Could not send error reply to client");
                        return;
                    }
                    if close_connection {
                        return;
                    }
                }
            }
        }
    });

    Ok(())
}

// Gets the reply to be sent to the client and tells if the connection should
// be closed afterwards.
fn handle_control_channel_error(logger: &slog::Logger, error: ControlChanError) -> (Reply, bool) {
    slog::warn!(logger, "Control channel error: {}", error);
    match error.kind() {
        ControlChanErrorKind::UnknownCommand { .. } => (Reply::new(ReplyCode::CommandSyntaxError, "Command not implemented"), false),
        ControlChanErrorKind::Utf8Error => (Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"), true),
        ControlChanErrorKind::InvalidCommand => (Reply::new(ReplyCode::ParameterSyntaxError, "Invalid Parameter"), false),
        ControlChanErrorKind::CommandLineTooLong => (Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"), true),
        ControlChanErrorKind::ControlChannelTimeout => (
            Reply::new(ReplyCode::ServiceNotAvailable, "Session timed out. Closing control connection"),
            true,
        ),
        _ => (Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"), true),
    }
}

struct PrimaryEventHandler<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    logger: slog::Logger,
    session: SharedSession<Storage, User>,
    authenticator: Arc<dyn Authenticator<User>>,
    perm: Arc<dyn Perm>,
    tls_configured: bool,
    passive_ports: RangeInclusive<u16>,
    passive_host: PassiveHost,
    tx_control_chan: Sender<ControlChanMsg>,
    local_addr: SocketAddr,
}

impl<Storage, User> PrimaryEventHandler<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle_internal_msg(&self, msg: ControlChanMsg) -> Result<Reply, ControlChanError> {
        use ControlChanMsg::*;

        match msg {
            SentData { .. } | WrittenData { .. } => {
                self.finish_transfer().await;
                Ok(Reply::new(ReplyCode::ClosingDataConnection, "Transfer complete"))
            }
            DirectoryListed => {
                self.finish_transfer().await;
                Ok(Reply::new(ReplyCode::ClosingDataConnection, "Closing data connection"))
            }
            DataConnectionFailed => {
                self.finish_transfer().await;
                Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Can't open data connection"))
            }
            TransferAborted => {
                self.finish_transfer().await;
                Ok(Reply::new(ReplyCode::ConnectionClosed, "Connection closed; transfer aborted"))
            }
            StorageError(err) => {
                self.finish_transfer().await;
                Ok(storage_error_reply(&err))
            }
            CommandChannelReply(reply) => Ok(reply),
            SecureControlChannel => {
                // The handshake already happened in the loop above.
                let mut session = self.session.lock().await;
                session.cmd_tls = true;
                Ok(Reply::none())
            }
            // Never reached: the loop returns on this message before the
            // chain sees it.
            ExitControlLoop => Ok(Reply::new(ReplyCode::ClosingControlConnection, "Bye!")),
        }
    }

    // A transfer attempt is over, however it went: release the abort token.
    // The REST offset is not touched here; a RETR consumes it when its
    // attempt starts, and no other command consumes it at all.
    async fn finish_transfer(&self) {
        let mut session = self.session.lock().await;
        session.data_busy = false;
        session.data_abort = None;
    }

    async fn handle_command(&self, cmd: Command) -> Result<Reply, ControlChanError> {
        // After EPSV ALL the session is locked out of every other
        // data-channel negotiation verb.
        if matches!(cmd, Command::Pasv | Command::Port { .. } | Command::Eprt { .. }) {
            let session = self.session.lock().await;
            if session.epsv_all {
                return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Not allowed after EPSV ALL"));
            }
        }
        let is_rnfr = matches!(cmd, Command::Rnfr { .. });

        let args = CommandContext {
            session: Arc::clone(&self.session),
            authenticator: Arc::clone(&self.authenticator),
            perm: Arc::clone(&self.perm),
            tls_configured: self.tls_configured,
            passive_ports: self.passive_ports.clone(),
            passive_host: self.passive_host.clone(),
            tx_control_chan: self.tx_control_chan.clone(),
            local_addr: self.local_addr,
            logger: self.logger.clone(),
        };

        let handler: Box<dyn CommandHandler<Storage, User>> = match cmd {
            Command::User { username } => Box::new(commands::User::new(username)),
            Command::Pass { password } => Box::new(commands::Pass::new(password)),
            Command::Quit => Box::new(commands::Quit),
            Command::Rein => Box::new(commands::Rein),
            Command::Noop => Box::new(commands::Noop),
            Command::Syst => Box::new(commands::Syst),
            Command::Feat => Box::new(commands::Feat),
            Command::Opts { option } => Box::new(commands::Opts::new(option)),
            Command::Type { param } => Box::new(commands::Type::new(param)),
            Command::Stru { param } => Box::new(commands::Stru::new(param)),
            Command::Mode { param } => Box::new(commands::Mode::new(param)),
            Command::Pwd => Box::new(commands::Pwd),
            Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
            Command::Cdup => Box::new(commands::Cdup),
            Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
            Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
            Command::Dele { path } => Box::new(commands::Dele::new(path)),
            Command::Size { path } => Box::new(commands::Size::new(path)),
            Command::Mdtm { path } => Box::new(commands::Mdtm::new(path)),
            Command::Rnfr { path } => Box::new(commands::Rnfr::new(path)),
            Command::Rnto { path } => Box::new(commands::Rnto::new(path)),
            Command::Stat { path } => Box::new(commands::Stat::new(path)),
            Command::Port { addr } => Box::new(commands::Port::new(addr)),
            Command::Eprt { proto, host, port } => Box::new(commands::Eprt::new(proto, host, port)),
            Command::Pasv => Box::new(commands::Pasv),
            Command::Epsv { param } => Box::new(commands::Epsv::new(param)),
            Command::Retr { path } => Box::new(commands::Retr::new(path)),
            Command::Stor { path } => Box::new(commands::Stor::new(path)),
            Command::Appe { path } => Box::new(commands::Appe::new(path)),
            Command::Stou => Box::new(commands::Stou),
            Command::Rest { offset } => Box::new(commands::Rest::new(offset)),
            Command::Abor => Box::new(commands::Abor),
            Command::Allo => Box::new(commands::Allo),
            Command::List { path } => Box::new(commands::List::new(path)),
            Command::Nlst { path } => Box::new(commands::Nlst::new(path)),
            Command::Auth { protocol } => Box::new(commands::Auth::new(protocol)),
            Command::Pbsz => Box::new(commands::Pbsz),
            Command::Prot { param } => Box::new(commands::Prot::new(param)),
            Command::Ccc => Box::new(commands::Ccc),
        };

        let reply = handler.handle(args).await;

        // RNFR is a two-command transaction: anything but an immediately
        // following RNTO forgets the staged source path. RNTO itself consumes
        // it inside the handler.
        if !is_rnfr {
            let mut session = self.session.lock().await;
            session.rename_from = None;
        }

        reply
    }
}

#[async_trait::async_trait]
impl<Storage, User> ControlChanMiddleware for PrimaryEventHandler<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        match event {
            Event::Command(cmd) => self.handle_command(cmd).await,
            Event::InternalMsg(msg) => self.handle_internal_msg(msg).await,
        }
    }
}

// Transfer-side driver failures surface on the control channel with the
// reply code their kind dictates.
fn storage_error_reply(err: &storage::Error) -> Reply {
    use storage::ErrorKind::*;
    match err.kind() {
        ExceededStorageAllocationError => Reply::new(ReplyCode::ExceededStorageAllocation, "Exceeded storage allocation"),
        FileNameNotAllowedError => Reply::new(ReplyCode::BadFileName, "File name not allowed"),
        InsufficientStorageSpaceError => Reply::new(ReplyCode::OutOfSpace, "Insufficient storage space"),
        LocalError => Reply::new(ReplyCode::LocalError, "Local error"),
        TransientFileNotAvailable => Reply::new(ReplyCode::TransientFileError, "File not available"),
        PermanentFileNotAvailable => Reply::new(ReplyCode::FileError, "File not available"),
        PermissionDenied => Reply::new(ReplyCode::FileError, "Permission denied"),
    }
}
