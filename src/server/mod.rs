//! The FTP protocol engine: per-connection control loop, data channel broker
//! and the accept loops that tie them to a listening socket.

pub(crate) mod chancomms;
pub(crate) mod controlchan;
pub(crate) mod datachan;
pub(crate) mod ftpserver;
pub(crate) mod session;
pub(crate) mod shutdown;
pub(crate) mod tls;

use tokio::io::{AsyncRead, AsyncWrite};

// The shape of a control or data stream once TLS (or the lack of it) has been
// decided: both halves boxed behind one object.
pub(crate) trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}
