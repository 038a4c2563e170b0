//! The RFC 2228 Data Channel Protection Level (`PROT`) command

use crate::{
    auth::UserDetail,
    server::controlchan::{
        command::ProtParam,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Prot {
    param: ProtParam,
}

impl Prot {
    pub fn new(param: ProtParam) -> Self {
        Prot { param }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Prot
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match self.param {
            ProtParam::Clear => {
                session.data_tls = false;
                Ok(Reply::new(ReplyCode::CommandOkay, "PROT OK. Data channel in plaintext"))
            }
            ProtParam::Private => {
                if !session.pbsz_done {
                    Ok(Reply::new(ReplyCode::BadCommandSequence, "PBSZ 0 must precede PROT"))
                } else if !args.tls_configured {
                    Ok(Reply::new(ReplyCode::ProtLevelNotSupported, "TLS/SSL not configured"))
                } else {
                    session.data_tls = true;
                    Ok(Reply::new(ReplyCode::CommandOkay, "PROT OK. Securing data channel"))
                }
            }
            ProtParam::Safe | ProtParam::Confidential => {
                Ok(Reply::new(ReplyCode::ProtLevelNotSupported, "PROT S/E not supported"))
            }
        }
    }
}
