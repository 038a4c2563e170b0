#![deny(missing_docs)]
//! Contains the `FileSystem` trait that the server drives transfers through,
//! along with the `Perm` oracle used for directory listings and the bundled
//! local-disk driver.

mod error;
pub use error::{Error, ErrorKind};

mod perm;
pub use perm::{Perm, SimplePerm};

pub mod filesystem;
pub use filesystem::Filesystem;

use async_trait::async_trait;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    result,
    time::SystemTime,
};
use tokio::io::AsyncRead;

/// The result type of every [`FileSystem`] operation.
pub type Result<T> = result::Result<T, Error>;

/// Represents the metadata of a file or directory as seen by a driver.
pub trait Metadata {
    /// Returns the length (size) of the file.
    fn len(&self) -> u64;

    /// Returns `self.len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the path is a directory.
    fn is_dir(&self) -> bool;

    /// Returns true if the path is a regular file.
    fn is_file(&self) -> bool;

    /// Returns true if the path is a symlink.
    fn is_symlink(&self) -> bool;

    /// Returns the last modified time of the path.
    fn modified(&self) -> Result<SystemTime>;
}

/// Pairs the virtual path of a directory entry with its [`Metadata`].
#[derive(Clone, Debug)]
pub struct Fileinfo<M>
where
    M: Metadata,
{
    /// Path of the entry, relative to the listed directory.
    pub path: PathBuf,
    /// The entry's metadata.
    pub metadata: M,
}

/// The interface between the protocol engine and a storage backend.
///
/// One instance exists per control connection, created by the driver factory
/// given to [`Server::new`](crate::Server::new) at accept time. All paths the
/// server passes in are absolute *virtual* POSIX-style paths, already
/// resolved against the session's working directory; the driver maps them
/// onto its own namespace.
#[async_trait]
pub trait FileSystem: Send + Sync + Debug {
    /// The concrete type of file readers handed out by [`get_file`](FileSystem::get_file).
    type File: AsyncRead + Send + Sync + Unpin;
    /// The concrete type of the [`Metadata`] used by this driver.
    type Meta: Metadata + Send + Sync;

    /// Called once when the owning session is created.
    async fn init(&self, _session_id: &str) {}

    /// Checks that `path` denotes a directory the session may enter.
    async fn change_dir(&self, path: &Path) -> Result<()>;

    /// Returns the [`Metadata`] for the given path.
    async fn stat(&self, path: &Path) -> Result<Self::Meta>;

    /// Returns the direct children of the given directory.
    async fn list_dir(&self, path: &Path) -> Result<Vec<Fileinfo<Self::Meta>>>;

    /// Creates the given directory.
    async fn make_dir(&self, path: &Path) -> Result<()>;

    /// Deletes the given directory. Must fail on anything else.
    async fn delete_dir(&self, path: &Path) -> Result<()>;

    /// Deletes the given file. Must fail on directories.
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Renames `from` to `to`.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Opens the given file for reading, positioned at byte `offset`.
    /// Returns the total file size next to the reader.
    async fn get_file(&self, path: &Path, offset: u64) -> Result<(u64, Self::File)>;

    /// Writes everything `reader` yields to the given file, truncating it
    /// unless `append` is set. Returns the number of bytes written.
    async fn put_file(&self, path: &Path, reader: &mut (dyn AsyncRead + Send + Unpin), append: bool) -> Result<u64>;
}
