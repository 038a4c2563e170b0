use thiserror::Error;

/// The error returned by [`Server::listen`] and [`Server::serve`].
///
/// [`Server::listen`]: crate::Server::listen
/// [`Server::serve`]: crate::Server::serve
#[derive(Debug, Error)]
pub enum ServerError {
    /// The accept loop stopped because a graceful shutdown was requested.
    /// Sessions that were already connected keep running.
    #[error("ftp: server closed")]
    Closed,
    /// Binding or accepting on the control listener failed.
    #[error("ftp: {0}")]
    Io(#[from] std::io::Error),
}
