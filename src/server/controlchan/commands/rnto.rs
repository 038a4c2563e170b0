//! The RFC 959 Rename To (`RNTO`) command

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

pub struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Self {
        Rnto { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Rnto
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.rename_from.take() {
            Some(from) => {
                let to = session.resolve(&self.path);
                match session.fs.rename(&from, &to).await {
                    Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Renamed")),
                    Err(err) => {
                        slog::warn!(args.logger, "Failed to rename {:?} to {:?}: {}", from, to, err);
                        Ok(Reply::new(ReplyCode::FileError, "Failed to rename"))
                    }
                }
            }
            None => Ok(Reply::new(ReplyCode::BadCommandSequence, "Tell me what to rename first (RNFR)")),
        }
    }
}
