//! Bundled authenticators: a single-credential checker and a deny-all.

use super::{AuthenticationError, Authenticator, DefaultUser};
use async_trait::async_trait;

/// An [`Authenticator`] that accepts exactly one username/password pair.
///
/// Handy for tests and single-user deployments; anything multi-user should
/// implement [`Authenticator`] against a real credential store.
#[derive(Debug)]
pub struct SimpleAuth {
    username: String,
    password: String,
}

impl SimpleAuth {
    /// Creates a new `SimpleAuth` accepting the given credentials.
    pub fn new<T: Into<String>>(username: T, password: T) -> Self {
        SimpleAuth {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Authenticator<DefaultUser> for SimpleAuth {
    async fn authenticate(&self, username: &str, password: &str) -> Result<DefaultUser, AuthenticationError> {
        if username != self.username {
            return Err(AuthenticationError::BadUser);
        }
        if password != self.password {
            return Err(AuthenticationError::BadPassword);
        }
        Ok(DefaultUser)
    }
}

/// The [`Authenticator`] used when none is configured: every login fails.
#[derive(Debug)]
pub struct DenyAuthenticator;

#[async_trait]
impl<U> Authenticator<U> for DenyAuthenticator
where
    U: super::UserDetail,
{
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<U, AuthenticationError> {
        Err(AuthenticationError::BadUser)
    }
}
