//! The RFC 2228 Protection Buffer Size (`PBSZ`) command
//
// For streaming TLS the only meaningful buffer size is 0, so the reply
// echoes that back whatever the client asked for. RFC 4217 wants PBSZ
// before PROT; we track that it happened.

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

pub struct Pbsz;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Pbsz
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.pbsz_done = true;
        Ok(Reply::new(ReplyCode::CommandOkay, "PBSZ=0"))
    }
}
