//! The RFC 959 Representation Type (`TYPE`) command

use crate::{
    auth::UserDetail,
    server::{
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        session::TransferType,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Self {
        Type { param }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Type
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match self.param.as_str() {
            "A" => {
                session.transfer_type = TransferType::Ascii;
                Ok(Reply::new(ReplyCode::CommandOkay, "Type set to ASCII"))
            }
            "I" => {
                session.transfer_type = TransferType::Image;
                Ok(Reply::new(ReplyCode::CommandOkay, "Type set to binary"))
            }
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Type not supported")),
        }
    }
}
