//! The RFC 959 Change To Parent Directory (`CDUP`) command

use super::cwd::Cwd;
use crate::{
    auth::UserDetail,
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Cdup;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Cdup
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        // CDUP is CWD with a fixed argument.
        Cwd::new("..".to_string()).handle(args).await
    }
}
