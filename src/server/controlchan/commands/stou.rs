//! The RFC 959 Store Unique (`STOU`) command
//
// STOR to a name of the server's choosing; the name travels back in the 150
// so the client can find its file again.

use crate::{
    auth::UserDetail,
    server::{
        chancomms::DataChanCmd,
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        datachan,
    },
    storage::FileSystem,
};
use async_trait::async_trait;
use uuid::Uuid;

pub struct Stou;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Stou
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let filename = Uuid::new_v4().to_string();
        let path = {
            let session = args.session.lock().await;
            session.resolve(&filename).to_string_lossy().to_string()
        };
        let reply = datachan::spawn_transfer(&args, DataChanCmd::Stor { path, append: false }).await;
        match reply {
            // Replace the generic 150 text with the chosen name.
            Reply::CodeAndMsg {
                code: ReplyCode::FileStatusOkay,
                ..
            } => Ok(Reply::new_with_string(ReplyCode::FileStatusOkay, format!("FILE: {}", filename))),
            other => Ok(other),
        }
    }
}
