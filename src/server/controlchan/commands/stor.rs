//! The RFC 959 Store (`STOR`) command
//
// Causes the server-DTP to accept the data transferred via the data
// connection and to store the data as a file. If the file exists it is
// replaced; otherwise it is created.

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

pub struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Self {
        Stor { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Stor
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let path = {
            let session = args.session.lock().await;
            session.resolve(&self.path).to_string_lossy().to_string()
        };
        Ok(datachan::spawn_transfer(&args, DataChanCmd::Stor { path, append: false }).await)
    }
}
