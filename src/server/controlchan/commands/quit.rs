//! The RFC 959 Logout (`QUIT`) command

use crate::{
    auth::UserDetail,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Quit;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Quit
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        // The loop exits on this message, right after the 221 went out.
        let tx = args.tx_control_chan.clone();
        let logger = args.logger;
        tokio::spawn(async move {
            if let Err(err) = tx.send(ControlChanMsg::ExitControlLoop).await {
                slog::warn!(logger, "Could not schedule control loop exit: {}", err);
            }
        });
        Ok(Reply::new(ReplyCode::ClosingControlConnection, "Goodbye"))
    }
}
