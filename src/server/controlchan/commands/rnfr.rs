//! The RFC 959 Rename From (`RNFR`) command

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

pub struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Self {
        Rnfr { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Rnfr
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        // The dispatcher clears the staged path again unless the very next
        // command is RNTO.
        let mut session = args.session.lock().await;
        let from = session.resolve(&self.path);
        session.rename_from = Some(from);
        Ok(Reply::new(ReplyCode::FileActionPending, "File or directory exists, ready for destination name"))
    }
}
