//! Contains the [`Server`] builder and its accept loops.

pub(crate) mod error;
pub(crate) mod options;

use super::{
    controlchan::{self, LoopConfig},
    shutdown,
    tls::{self, FtpsConfig},
    AsyncStream,
};
use crate::{
    auth::{Authenticator, DefaultUser, DenyAuthenticator, UserDetail},
    storage::{FileSystem, Filesystem, Perm, SimplePerm},
};
use error::ServerError;
use options::PassiveHost;
use std::{
    io,
    net::SocketAddr,
    ops::RangeInclusive,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_rustls::TlsAcceptor;

/// An instance of an FTP(S) server. It holds a factory producing one
/// [`FileSystem`] driver per connection, an [`Authenticator`] deciding who
/// gets in, and a [`Perm`] oracle consulted for directory listings.
///
/// The server is started with [`listen`](Server::listen) (bind + accept) or
/// [`serve`](Server::serve) (accept on a pre-bound listener). Both run until
/// a [`ShutdownHandle`] stops the accept loop; sessions that are already
/// connected run to natural termination.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use ftpkit::Server;
/// use ftpkit::auth::SimpleAuth;
/// use std::sync::Arc;
///
/// let server = Server::with_fs_root("/srv/ftp")
///     .authenticator(Arc::new(SimpleAuth::new("admin", "123456")))
///     .passive_ports(50000..=51000);
/// server.listen("0.0.0.0:2121").await.unwrap();
/// # }
/// ```
pub struct Server<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    fs_factory: Box<dyn Fn() -> Storage + Send + Sync>,
    greeting: String,
    authenticator: Arc<dyn Authenticator<User>>,
    perm: Arc<dyn Perm>,
    passive_ports: RangeInclusive<u16>,
    passive_host: PassiveHost,
    certs_and_key: Option<(PathBuf, PathBuf)>,
    explicit_ftps: bool,
    idle_session_timeout: Duration,
    logger: slog::Logger,
    shutdown: Arc<shutdown::Notifier>,
}

impl Server<Filesystem, DefaultUser> {
    /// Creates a server serving the local filesystem below the given root.
    pub fn with_fs_root<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        Server::new(Box::new(move || Filesystem::new(path.clone())))
    }
}

impl<Storage, User> Server<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    /// Creates a server around a driver factory. The factory runs once per
    /// accepted control connection.
    ///
    /// Until [`authenticator`](Server::authenticator) is called every login
    /// is refused.
    pub fn new(fs_factory: Box<dyn Fn() -> Storage + Send + Sync>) -> Self
    where
        DenyAuthenticator: Authenticator<User>,
    {
        Server {
            fs_factory,
            greeting: options::DEFAULT_GREETING.to_string(),
            authenticator: Arc::new(DenyAuthenticator),
            perm: Arc::new(SimplePerm::default()),
            passive_ports: options::DEFAULT_PASSIVE_PORTS,
            passive_host: PassiveHost::FromConnection,
            certs_and_key: None,
            explicit_ftps: false,
            idle_session_timeout: options::DEFAULT_IDLE_SESSION_TIMEOUT,
            logger: slog::Logger::root(slog::Discard, slog::o!()),
            shutdown: Arc::new(shutdown::Notifier::new()),
        }
    }

    /// Sets the text sent after the `220` greeting code.
    pub fn greeting<T: Into<String>>(mut self, greeting: T) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the [`Authenticator`] deciding which USER/PASS pairs get in.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator<User>>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Sets the [`Perm`] oracle used when rendering directory listings.
    pub fn perm(mut self, perm: Arc<dyn Perm>) -> Self {
        self.perm = perm;
        self
    }

    /// Restricts passive-mode listeners to the given port range.
    pub fn passive_ports(mut self, range: RangeInclusive<u16>) -> Self {
        self.passive_ports = range;
        self
    }

    /// Sets the address advertised in `PASV` replies.
    pub fn passive_host<H: Into<PassiveHost>>(mut self, host: H) -> Self {
        self.passive_host = host.into();
        self
    }

    /// Enables FTPS with the given PEM certificate chain and private key.
    /// Without [`explicit_ftps`](Server::explicit_ftps) the listener speaks
    /// TLS from the first byte (implicit mode).
    pub fn ftps<P: Into<PathBuf>>(mut self, certs_file: P, key_file: P) -> Self {
        self.certs_and_key = Some((certs_file.into(), key_file.into()));
        self
    }

    /// Switches FTPS to the RFC 4217 explicit mode: connections start in
    /// plaintext and upgrade on `AUTH TLS`.
    pub fn explicit_ftps(mut self, explicit: bool) -> Self {
        self.explicit_ftps = explicit;
        self
    }

    /// Sets how long a session may sit idle before it is disconnected.
    pub fn idle_session_timeout(mut self, timeout: Duration) -> Self {
        self.idle_session_timeout = timeout;
        self
    }

    /// Installs a session-aware log sink. Defaults to discarding everything.
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Returns a handle that stops the accept loop when triggered. Obtain it
    /// before calling [`listen`](Server::listen) or [`serve`](Server::serve).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notifier: Arc::clone(&self.shutdown),
        }
    }

    /// Binds to the given address and accepts control connections until
    /// shutdown. Returns [`ServerError::Closed`] on a graceful stop.
    pub async fn listen<A: ToSocketAddrs>(self, addr: A) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accepts control connections on a pre-bound listener until shutdown.
    /// Returns [`ServerError::Closed`] on a graceful stop.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let ftps_config = match &self.certs_and_key {
            Some((certs_file, key_file)) => FtpsConfig::On {
                tls_config: tls::new_config(certs_file, key_file)?,
            },
            None => FtpsConfig::Off,
        };

        let mut shutdown_listener = self.shutdown.subscribe();
        slog::info!(self.logger, "Listening for control connections"; "addr" => ?listener.local_addr().ok());

        loop {
            tokio::select! {
                _ = shutdown_listener.listen() => {
                    slog::info!(self.logger, "Shutting down acceptor. Live sessions run to completion");
                    return Err(ServerError::Closed);
                }
                result = listener.accept() => match result {
                    Ok((tcp_stream, peer_addr)) => {
                        slog::info!(self.logger, "Incoming control connection"; "peer" => %peer_addr);
                        self.spawn_session(tcp_stream, peer_addr, ftps_config.clone());
                    }
                    Err(err) if is_temporary_accept_error(&err) => {
                        slog::warn!(self.logger, "Temporary error accepting control connection: {}", err);
                    }
                    Err(err) => {
                        slog::error!(self.logger, "Fatal error accepting control connection: {}", err);
                        return Err(err.into());
                    }
                }
            }
        }
    }

    // Sets up one control connection in its own task so that a slow TLS
    // handshake cannot stall the acceptor.
    fn spawn_session(&self, tcp_stream: TcpStream, peer_addr: SocketAddr, ftps_config: FtpsConfig) {
        let local_addr = match tcp_stream.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                slog::warn!(self.logger, "Could not determine local address: {}", err);
                return;
            }
        };

        let fs = (self.fs_factory)();
        let config = LoopConfig {
            authenticator: Arc::clone(&self.authenticator),
            perm: Arc::clone(&self.perm),
            greeting: self.greeting.clone(),
            passive_ports: self.passive_ports.clone(),
            passive_host: self.passive_host.clone(),
            ftps_config: ftps_config.clone(),
            idle_session_timeout: self.idle_session_timeout,
            logger: self.logger.clone(),
        };
        let logger = self.logger.clone();
        let implicit_tls = ftps_config.is_on() && !self.explicit_ftps;

        tokio::spawn(async move {
            let result = if implicit_tls {
                let acceptor: TlsAcceptor = match &config.ftps_config {
                    FtpsConfig::On { tls_config } => Arc::clone(tls_config).into(),
                    FtpsConfig::Off => unreachable!("implicit TLS requires a TLS config"),
                };
                match acceptor.accept(tcp_stream).await {
                    Ok(tls_stream) => {
                        let stream: Box<dyn AsyncStream> = Box::new(tls_stream);
                        controlchan::spawn_loop(config, stream, local_addr, peer_addr, true, fs).await
                    }
                    Err(err) => {
                        slog::warn!(logger, "Implicit TLS handshake failed: {}", err; "peer" => %peer_addr);
                        return;
                    }
                }
            } else {
                let stream: Box<dyn AsyncStream> = Box::new(tcp_stream);
                controlchan::spawn_loop(config, stream, local_addr, peer_addr, false, fs).await
            };
            if let Err(err) = result {
                slog::error!(logger, "Could not spawn control loop: {:?}", err; "peer" => %peer_addr);
            }
        });
    }
}

// The accept loop shrugs these off and keeps accepting; anything else is
// treated as fatal to the listener.
fn is_temporary_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset | io::ErrorKind::Interrupted
    )
}

/// Stops a [`Server`]'s accept loop from the outside.
///
/// Triggering it makes `listen`/`serve` return [`ServerError::Closed`];
/// sessions that are already connected keep running until they quit on their
/// own.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    notifier: Arc<shutdown::Notifier>,
}

impl ShutdownHandle {
    /// Requests the graceful stop.
    pub fn shutdown(&self) {
        self.notifier.notify();
    }
}
