//! The RFC 2428 Extended Data Port (`EPRT`) command
//
// EPRT |af|addr|port| carries an explicit address family: 1 for IPv4 and 2
// for IPv6. Anything else earns a 522 listing what we do support.

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
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub struct Eprt {
    proto: String,
    host: String,
    port: u16,
}

impl Eprt {
    pub fn new(proto: String, host: String, port: u16) -> Self {
        Eprt { proto, host, port }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Eprt
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let ip: Result<IpAddr, _> = match self.proto.as_str() {
            "1" => self.host.parse::<Ipv4Addr>().map(IpAddr::V4),
            "2" => self.host.parse::<Ipv6Addr>().map(IpAddr::V6),
            _ => {
                return Ok(Reply::new(
                    ReplyCode::ExtendedPortUnknownProtocol,
                    "Network protocol not supported, use (1,2)",
                ))
            }
        };
        match ip {
            Ok(ip) => {
                let mut session = args.session.lock().await;
                session.data_endpoint = Some(DataEndpoint::Active(SocketAddr::new(ip, self.port)));
                Ok(Reply::new(ReplyCode::CommandOkay, "EPRT command successful"))
            }
            Err(_) => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid network address")),
        }
    }
}
