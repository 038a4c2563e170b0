//! The RFC 959 Transfer Mode (`MODE`) command
//
// Stream mode only; block and compressed mode are not implemented.

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

pub struct Mode {
    param: String,
}

impl Mode {
    pub fn new(param: String) -> Self {
        Mode { param }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Mode
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, _args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        match self.param.as_str() {
            "S" => Ok(Reply::new(ReplyCode::CommandOkay, "Mode set to stream")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Mode not supported")),
        }
    }
}
