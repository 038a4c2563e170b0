#![deny(missing_docs)]
//! An embeddable FTP(S) server library for Rust
//!
//! ftpkit implements the classic FTP protocol family (RFC 959, with the
//! RFC 2228/4217 security extensions, RFC 2389 FEAT, RFC 3659 MDTM/SIZE and
//! RFC 2428 EPSV/EPRT) as a per-connection protocol engine over pluggable
//! filesystem, authentication and permission backends.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let server = ftpkit::Server::with_fs_root(std::env::temp_dir())
//!     .greeting("Welcome to my FTP server")
//!     .passive_ports(50000..=65535);
//!
//! server.listen("127.0.0.1:2121").await.unwrap();
//! # }
//! ```
//!
//! The listing above serves the OS temp directory, but refuses every login:
//! without an [`auth::Authenticator`] nobody gets in. Plug in
//! [`auth::SimpleAuth`] or your own implementation to let users in.

pub mod auth;
pub(crate) mod server;
pub mod storage;

pub use crate::server::ftpserver::{error::ServerError, options::PassiveHost, Server, ShutdownHandle};
