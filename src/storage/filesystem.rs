//! A [`FileSystem`] driver that serves files from a local directory, like a
//! traditional FTP server.

use crate::storage::{Error, ErrorKind, FileSystem, Fileinfo, Metadata, Result};
use async_trait::async_trait;
use std::{
    path::{Component, Path, PathBuf},
    time::SystemTime,
};
use tokio::io::{AsyncRead, AsyncSeekExt};

/// Keeps all of a session's files inside a specific root directory on local
/// disk. Virtual paths are mapped below the root; sequences like `../` can
/// never escape it.
#[derive(Debug)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    /// Creates a new `Filesystem` driver with the given root. When the root
    /// is `/srv/ftp` and a client asks for `/hello.txt`, the server reads
    /// `/srv/ftp/hello.txt`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Filesystem { root: root.into() }
    }

    // Maps a virtual path onto the real filesystem. `..` components are
    // resolved lexically within the virtual namespace so the result always
    // stays below the root.
    fn real_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let mut real = self.root.clone();
        for component in path.as_ref().components() {
            match component {
                Component::Normal(p) => real.push(p),
                Component::ParentDir => {
                    if real != self.root {
                        real.pop();
                    }
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        real
    }
}

#[async_trait]
impl FileSystem for Filesystem {
    type File = tokio::fs::File;
    type Meta = std::fs::Metadata;

    async fn change_dir(&self, path: &Path) -> Result<()> {
        let meta = tokio::fs::symlink_metadata(self.real_path(path)).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::PermanentFileNotAvailable, "not a directory"))
        }
    }

    async fn stat(&self, path: &Path) -> Result<Self::Meta> {
        Ok(tokio::fs::symlink_metadata(self.real_path(path)).await?)
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<Fileinfo<Self::Meta>>> {
        let mut rd = tokio::fs::read_dir(self.real_path(path)).await?;
        let mut entries = vec![];
        while let Some(dir_entry) = rd.next_entry().await? {
            let metadata = tokio::fs::symlink_metadata(dir_entry.path()).await?;
            entries.push(Fileinfo {
                path: PathBuf::from(dir_entry.file_name()),
                metadata,
            });
        }
        Ok(entries)
    }

    async fn make_dir(&self, path: &Path) -> Result<()> {
        Ok(tokio::fs::create_dir_all(self.real_path(path)).await?)
    }

    async fn delete_dir(&self, path: &Path) -> Result<()> {
        let real = self.real_path(path);
        let meta = tokio::fs::symlink_metadata(&real).await?;
        if meta.is_dir() {
            Ok(tokio::fs::remove_dir(real).await?)
        } else {
            Err(Error::new(ErrorKind::PermanentFileNotAvailable, "not a directory"))
        }
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        let real = self.real_path(path);
        let meta = tokio::fs::symlink_metadata(&real).await?;
        if meta.is_dir() {
            Err(Error::new(ErrorKind::PermanentFileNotAvailable, "not a file"))
        } else {
            Ok(tokio::fs::remove_file(real).await?)
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Ok(tokio::fs::rename(self.real_path(from), self.real_path(to)).await?)
    }

    async fn get_file(&self, path: &Path, offset: u64) -> Result<(u64, Self::File)> {
        let mut file = tokio::fs::File::open(self.real_path(path)).await?;
        let size = file.metadata().await?.len();
        if offset > 0 {
            file.seek(std::io::SeekFrom::Start(offset)).await?;
        }
        Ok((size, file))
    }

    async fn put_file(&self, path: &Path, reader: &mut (dyn AsyncRead + Send + Unpin), append: bool) -> Result<u64> {
        let real = self.real_path(path);
        if let Ok(meta) = tokio::fs::symlink_metadata(&real).await {
            if meta.is_dir() {
                return Err(Error::new(ErrorKind::FileNameNotAllowedError, "a directory has the same name"));
            }
        }

        let mut file = if append {
            tokio::fs::OpenOptions::new().append(true).create(true).open(real).await?
        } else {
            tokio::fs::File::create(real).await?
        };

        let bytes_copied = tokio::io::copy(reader, &mut file).await?;
        Ok(bytes_copied)
    }
}

impl Metadata for std::fs::Metadata {
    fn len(&self) -> u64 {
        self.len()
    }

    fn is_dir(&self) -> bool {
        self.is_dir()
    }

    fn is_file(&self) -> bool {
        self.is_file()
    }

    fn is_symlink(&self) -> bool {
        self.file_type().is_symlink()
    }

    fn modified(&self) -> Result<SystemTime> {
        self.modified().map_err(|_| Error::from(ErrorKind::PermanentFileNotAvailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn real_path_stays_below_root() {
        let fs = Filesystem::new("/srv/ftp");
        assert_eq!(fs.real_path("/hello.txt"), PathBuf::from("/srv/ftp/hello.txt"));
        assert_eq!(fs.real_path("/a/b/../c"), PathBuf::from("/srv/ftp/a/c"));
        assert_eq!(fs.real_path("/../../etc/passwd"), PathBuf::from("/srv/ftp/etc/passwd"));
        assert_eq!(fs.real_path("/"), PathBuf::from("/srv/ftp"));
    }

    #[tokio::test]
    async fn stat_reports_file_metadata() {
        let root = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new_in(root.path()).unwrap();
        file.write_all(b"hello").unwrap();

        let fs = Filesystem::new(root.path());
        let virt = Path::new("/").join(file.path().file_name().unwrap());
        let meta = fs.stat(&virt).await.unwrap();

        assert!(meta.is_file());
        assert_eq!(Metadata::len(&meta), 5);
    }

    #[tokio::test]
    async fn list_dir_returns_direct_children_only() {
        let root = tempfile::tempdir().unwrap();
        std::fs::File::create(root.path().join("a.txt")).unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        std::fs::File::create(root.path().join("sub").join("nested.txt")).unwrap();

        let fs = Filesystem::new(root.path());
        let mut names: Vec<String> = fs
            .list_dir(Path::new("/"))
            .await
            .unwrap()
            .into_iter()
            .map(|fi| fi.path.to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.txt", "sub"]);
    }

    #[tokio::test]
    async fn get_file_honors_offset() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("f"), b"abcdef").unwrap();

        let fs = Filesystem::new(root.path());
        let (size, mut reader) = fs.get_file(Path::new("/f"), 3).await.unwrap();
        let mut out = Vec::new();
        tokio::io::copy(&mut reader, &mut out).await.unwrap();

        assert_eq!(size, 6);
        assert_eq!(out, b"def");
    }

    #[tokio::test]
    async fn put_file_appends_or_truncates() {
        let root = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(root.path());

        let mut data: &[u8] = b"hello";
        fs.put_file(Path::new("/greeting.txt"), &mut data, false).await.unwrap();
        let mut more: &[u8] = b" world";
        fs.put_file(Path::new("/greeting.txt"), &mut more, true).await.unwrap();
        assert_eq!(std::fs::read(root.path().join("greeting.txt")).unwrap(), b"hello world");

        let mut replaced: &[u8] = b"bye";
        fs.put_file(Path::new("/greeting.txt"), &mut replaced, false).await.unwrap();
        assert_eq!(std::fs::read(root.path().join("greeting.txt")).unwrap(), b"bye");
    }

    #[tokio::test]
    async fn delete_file_refuses_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("d")).unwrap();

        let fs = Filesystem::new(root.path());
        assert!(fs.delete_file(Path::new("/d")).await.is_err());
        assert!(fs.delete_dir(Path::new("/d")).await.is_ok());
    }
}
