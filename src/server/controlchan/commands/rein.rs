//! The RFC 959 Reinitialize (`REIN`) command

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

pub struct Rein;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Rein
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.reinitialize();
        Ok(Reply::new(ReplyCode::ServiceReady, "Service ready for new user"))
    }
}
