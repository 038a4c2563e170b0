//! The RFC 959 Append (`APPE`) command
//
// Like STOR, but if the file already exists the data is appended to it
// rather than replacing it.

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

pub struct Appe {
    path: String,
}

impl Appe {
    pub fn new(path: String) -> Self {
        Appe { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Appe
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let path = {
            let session = args.session.lock().await;
            session.resolve(&self.path).to_string_lossy().to_string()
        };
        Ok(datachan::spawn_transfer(&args, DataChanCmd::Stor { path, append: true }).await)
    }
}
