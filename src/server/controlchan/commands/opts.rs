//! The RFC 2389 Options (`OPTS`) command

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

pub struct Opts {
    option: String,
}

impl Opts {
    pub fn new(option: String) -> Self {
        Opts { option }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Opts
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, _args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        // Path names travel as UTF-8 either way; the option is just accepted.
        match self.option.trim().to_uppercase().as_str() {
            "UTF8 ON" => Ok(Reply::new(ReplyCode::CommandOkay, "Always in UTF-8 mode")),
            "UTF8 OFF" => Ok(Reply::new(ReplyCode::CommandOkay, "Always in UTF-8 mode")),
            _ => Ok(Reply::new(ReplyCode::CommandSyntaxError, "Option not understood")),
        }
    }
}
