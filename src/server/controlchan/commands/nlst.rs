//! The RFC 959 Name List (`NLST`) command
//
// Like LIST, but each line carries a bare name and nothing else.

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

pub struct Nlst {
    path: Option<String>,
}

impl Nlst {
    pub fn new(path: Option<String>) -> Self {
        Nlst { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Nlst
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let path = {
            let session = args.session.lock().await;
            session.resolve(self.path.as_deref().unwrap_or(".")).to_string_lossy().to_string()
        };
        Ok(datachan::spawn_transfer(&args, DataChanCmd::Nlst { path }).await)
    }
}
