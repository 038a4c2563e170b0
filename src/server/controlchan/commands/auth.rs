//! The RFC 2228/4217 `AUTH` command used to upgrade the control channel
//
// A client requests TLS with the AUTH command and then decides if it wishes
// to secure the data connections by use of the PBSZ and PROT commands.

use crate::{
    auth::UserDetail,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{
            command::AuthParam,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
    },
    storage::FileSystem,
};
use async_trait::async_trait;

pub struct Auth {
    protocol: AuthParam,
}

impl Auth {
    pub fn new(protocol: AuthParam) -> Self {
        Auth { protocol }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Auth
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        if !args.tls_configured {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "TLS/SSL not configured"));
        }
        {
            let session = args.session.lock().await;
            if session.cmd_tls {
                return Ok(Reply::new(ReplyCode::FtpsRequired, "Control channel already secured"));
            }
        }

        // AUTH SSL is accepted as a synonym; the handshake is TLS either way.
        // The loop performs the handshake right after this 234 goes out.
        slog::info!(args.logger, "Client requested AUTH {:?}", self.protocol);
        let tx = args.tx_control_chan.clone();
        let logger = args.logger;
        tokio::spawn(async move {
            if let Err(err) = tx.send(ControlChanMsg::SecureControlChannel).await {
                slog::warn!(logger, "Could not schedule TLS upgrade: {}", err);
            }
        });
        Ok(Reply::new(ReplyCode::AuthOkayNoDataNeeded, "AUTH command OK. Initializing TLS connection"))
    }
}
