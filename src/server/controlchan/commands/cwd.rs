//! The RFC 959 Change Working Directory (`CWD`) command

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

pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Cwd
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let target = session.resolve(&self.path);
        match session.fs.change_dir(&target).await {
            Ok(()) => {
                session.cwd = target;
                Ok(Reply::new_with_string(
                    ReplyCode::FileActionOkay,
                    format!("Directory changed to \"{}\"", session.cwd.display()),
                ))
            }
            Err(err) => {
                slog::warn!(args.logger, "Failed to change directory to {:?}: {}", target, err);
                Ok(Reply::new(ReplyCode::FileError, "Failed to change directory"))
            }
        }
    }
}
