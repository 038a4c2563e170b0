//! The RFC 2428 Extended Passive (`EPSV`) command
//
// Like PASV, but the reply carries only the port, which makes it address
// family agnostic. `EPSV ALL` locks the session into extended passive mode.

use super::passive_common::bind_passive_listener;
use crate::{
    auth::UserDetail,
    server::{
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        datachan::DataEndpoint,
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Epsv {
    param: Option<String>,
}

impl Epsv {
    pub fn new(param: Option<String>) -> Self {
        Epsv { param }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Epsv
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        match self.param.as_deref() {
            Some("ALL") => {
                let mut session = args.session.lock().await;
                session.epsv_all = true;
                return Ok(Reply::new(ReplyCode::CommandOkay, "EPSV ALL ok"));
            }
            None | Some("1") | Some("2") => {}
            Some(_) => return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid EPSV argument")),
        }

        let listener = match bind_passive_listener(args.local_addr.ip(), &args.passive_ports) {
            Ok(listener) => listener,
            Err(err) => {
                slog::warn!(args.logger, "Could not bind a passive listener: {}", err);
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established"));
            }
        };
        let port = listener.local_addr()?.port();

        let mut session = args.session.lock().await;
        session.data_endpoint = Some(DataEndpoint::Passive(listener));

        Ok(Reply::new_with_string(
            ReplyCode::EnteringExtendedPassiveMode,
            format!("Entering Extended Passive Mode (|||{}|)", port),
        ))
    }
}
