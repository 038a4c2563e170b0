//! The RFC 959 Delete (`DELE`) command

use crate::{
    auth::UserDetail,
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Dele
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let path = session.resolve(&self.path);
        match session.fs.delete_file(&path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File removed")),
            Err(err) => {
                slog::warn!(args.logger, "Failed to delete file {:?}: {}", path, err);
                Ok(Reply::new(ReplyCode::FileError, "Failed to delete file"))
            }
        }
    }
}
