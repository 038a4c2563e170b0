//! The RFC 959 List (`LIST`) command
//
// Sends a directory listing in the BSD `ls -l` format over the data
// connection; mode, owner and group come from the permission oracle.

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

pub struct List {
    path: Option<String>,
}

impl List {
    pub fn new(path: Option<String>) -> Self {
        List { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for List
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let path = {
            let session = args.session.lock().await;
            session.resolve(self.path.as_deref().unwrap_or(".")).to_string_lossy().to_string()
        };
        Ok(datachan::spawn_transfer(&args, DataChanCmd::List { path }).await)
    }
}
