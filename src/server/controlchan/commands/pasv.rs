//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data port and to
// wait for a connection rather than initiate one upon receipt of a transfer
// command. The reply includes the host and port address this server is
// listening on.

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
        ftpserver::options::PassiveHost,
    },
    storage::FileSystem,
};
use async_trait::async_trait;
use std::net::IpAddr;

pub struct Pasv;

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Pasv
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        // The 227 reply format cannot carry an IPv6 address.
        let advertised = match (&args.passive_host, args.local_addr.ip()) {
            (PassiveHost::Ip(ip), _) => *ip,
            (PassiveHost::FromConnection, IpAddr::V4(ip)) => ip,
            (PassiveHost::FromConnection, IpAddr::V6(_)) => {
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "PASV not available on IPv6, use EPSV"))
            }
        };

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

        let octets = advertised.octets();
        let (p1, p2) = (port >> 8, port & 0xff);
        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!(
                "Entering Passive Mode ({},{},{},{},{},{})",
                octets[0], octets[1], octets[2], octets[3], p1, p2
            ),
        ))
    }
}
