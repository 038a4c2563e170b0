//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the file,
// specified in the pathname, over the data connection. The status and
// contents of the file at the server site shall be unaffected.

use crate::{
    auth::UserDetail,
    server::{
        chancomms::DataChanCmd,
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply,
        },
        datachan,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Retr
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let path = {
            let session = args.session.lock().await;
            session.resolve(&self.path).to_string_lossy().to_string()
        };
        Ok(datachan::spawn_transfer(&args, DataChanCmd::Retr { path }).await)
    }
}
