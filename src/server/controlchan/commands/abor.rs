//! The RFC 959 Abort (`ABOR`) command
//
// Tells the server to abort the previous FTP service command and any
// associated transfer of data. The control connection is not to be closed,
// but the data connection must be.

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

pub struct Abor;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Abor
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // A passive listener nobody connected to yet dies here as well.
        session.data_endpoint = None;
        match session.data_abort.take() {
            Some(token) => {
                // The transfer task answers with 426 followed by the 226
                // acknowledging this command, in that order.
                token.cancel();
                Ok(Reply::none())
            }
            None => Ok(Reply::new(ReplyCode::ClosingDataConnection, "ABOR command successful")),
        }
    }
}
