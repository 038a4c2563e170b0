//! The RFC 3659 File Size (`SIZE`) command

use crate::{
    auth::UserDetail,
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    storage::{FileSystem, Metadata},
};
use async_trait::async_trait;

pub struct Size {
    path: String,
}

impl Size {
    pub fn new(path: String) -> Self {
        Size { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Size
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let path = session.resolve(&self.path);
        match session.fs.stat(&path).await {
            // SIZE is defined for regular files only.
            Ok(meta) if meta.is_file() => Ok(Reply::new_with_string(ReplyCode::FileStatus, format!("{}", meta.len()))),
            Ok(_) => Ok(Reply::new(ReplyCode::FileError, "Not a regular file")),
            Err(err) => {
                slog::warn!(args.logger, "Failed to stat {:?}: {}", path, err);
                Ok(Reply::new(ReplyCode::FileError, "Could not get file status"))
            }
        }
    }
}
