//! The RFC 3659 Modification Time (`MDTM`) command

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
use chrono::{DateTime, Utc};

pub struct Mdtm {
    path: String,
}

impl Mdtm {
    pub fn new(path: String) -> Self {
        Mdtm { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Mdtm
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let path = session.resolve(&self.path);
        match session.fs.stat(&path).await {
            Ok(meta) => match meta.modified() {
                Ok(modified) => {
                    let modified: DateTime<Utc> = modified.into();
                    Ok(Reply::new_with_string(ReplyCode::FileStatus, modified.format("%Y%m%d%H%M%S").to_string()))
                }
                Err(_) => Ok(Reply::new(ReplyCode::FileError, "Could not get modification time")),
            },
            Err(err) => {
                slog::warn!(args.logger, "Failed to stat {:?}: {}", path, err);
                Ok(Reply::new(ReplyCode::FileError, "Could not get file status"))
            }
        }
    }
}
