#![deny(missing_docs)]
//! Contains the `Authenticator` and `UserDetail` traits that the server uses
//! to authenticate users.
//!
//! Defines the common interface that can be implemented for a multitude of
//! authentication backends, e.g. *LDAP* or *PAM*. A couple of simple
//! implementations ship with the crate: [`SimpleAuth`] checks a single
//! username/password pair, and [`DenyAuthenticator`] (the default when no
//! authenticator is configured) refuses everybody.

pub(crate) mod authenticator;
pub use authenticator::{AuthenticationError, Authenticator};

mod simple;
pub use simple::{DenyAuthenticator, SimpleAuth};

mod user;
pub use user::{DefaultUser, UserDetail};
