use crate::{
    auth::{Authenticator, UserDetail},
    server::{
        chancomms::ControlChanMsg,
        controlchan::{error::ControlChanError, Reply},
        ftpserver::options::PassiveHost,
        session::SharedSession,
    },
    storage::{FileSystem, Perm},
};
use async_trait::async_trait;
use std::{net::SocketAddr, ops::RangeInclusive, sync::Arc};
use tokio::sync::mpsc::Sender;

// Common interface for all handlers of `Command`s
#[async_trait]
pub(crate) trait CommandHandler<Storage, User>: Send + Sync
where
    Storage: FileSystem + 'static,
    User: UserDetail,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError>;
}

// Represents arguments passed to a `CommandHandler`
pub(crate) struct CommandContext<Storage, User>
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    pub session: SharedSession<Storage, User>,
    pub authenticator: Arc<dyn Authenticator<User>>,
    pub perm: Arc<dyn Perm>,
    pub tls_configured: bool,
    pub passive_ports: RangeInclusive<u16>,
    pub passive_host: PassiveHost,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub local_addr: SocketAddr,
    pub logger: slog::Logger,
}
