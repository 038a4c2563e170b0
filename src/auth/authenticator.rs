//! The service provider interface (SPI) for auth

use super::UserDetail;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Defines the requirements for authentication implementations.
///
/// The server calls [`authenticate`](Authenticator::authenticate) once per
/// `USER`/`PASS` exchange. Implementations must be safe for concurrent use;
/// a single instance is shared by all sessions.
///
/// To define an `Authenticator` that, say, randomly decides:
///
/// ```rust
/// use ftpkit::auth::{AuthenticationError, Authenticator, DefaultUser};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct RandomAuthenticator;
///
/// #[async_trait]
/// impl Authenticator<DefaultUser> for RandomAuthenticator {
///     async fn authenticate(&self, _username: &str, _password: &str) -> Result<DefaultUser, AuthenticationError> {
///         if rand::random() {
///             Ok(DefaultUser)
///         } else {
///             Err(AuthenticationError::BadPassword)
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Authenticator<U>: Sync + Send + Debug
where
    U: UserDetail,
{
    /// Authenticate the given user with the given password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<U, AuthenticationError>;
}

/// The error type returned by [`Authenticator::authenticate`].
///
/// The server replies `530` to the client for every variant; the distinction
/// only shows up in the logs.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The username is not known.
    #[error("unknown user")]
    BadUser,
    /// The username exists but the password doesn't match.
    #[error("bad password")]
    BadPassword,
    /// The backend itself failed.
    #[error("authentication backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
