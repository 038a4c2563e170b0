//! The RFC 959 File Structure (`STRU`) command
//
// Only the default file structure is supported; record and page structure
// belong to another era.

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

pub struct Stru {
    param: String,
}

impl Stru {
    pub fn new(param: String) -> Self {
        Stru { param }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Stru
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, _args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        match self.param.as_str() {
            "F" => Ok(Reply::new(ReplyCode::CommandOkay, "Structure set to F")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Structure not supported")),
        }
    }
}
