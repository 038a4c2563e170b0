//! The RFC 959 Data Port (`PORT`) command
//
// The argument is the concatenation of a 32-bit internet host address and a
// 16-bit TCP port address, broken into six 8-bit fields transmitted as
// decimal numbers separated by commas:
//
//   PORT h1,h2,h3,h4,p1,p2
//
// We dial that address once the next data-bearing command arrives.

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
use std::net::{SocketAddr, SocketAddrV4};

pub struct Port {
    addr: SocketAddrV4,
}

impl Port {
    pub fn new(addr: SocketAddrV4) -> Self {
        Port { addr }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Port
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.data_endpoint = Some(DataEndpoint::Active(SocketAddr::V4(self.addr)));
        Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
    }
}
