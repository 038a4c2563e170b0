//! The RFC 959 Status (`STAT`) command
//
// Without an argument this reports on the server itself; with a path it
// reports on that path over the control channel, no data connection needed.

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

pub struct Stat {
    path: Option<String>,
}

impl Stat {
    pub fn new(path: Option<String>) -> Self {
        Stat { path }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Stat
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        match &self.path {
            None => {
                let session = args.session.lock().await;
                match &*session.user {
                    Some(user) => Ok(Reply::new_with_string(ReplyCode::SystemStatus, format!("Logged in as {}", user))),
                    None => Ok(Reply::new(ReplyCode::SystemStatus, "Server ready")),
                }
            }
            Some(path) => {
                let session = args.session.lock().await;
                let path = session.resolve(path);
                match session.fs.stat(&path).await {
                    Ok(_) => Ok(Reply::new_with_string(ReplyCode::FileStatus, format!("{}", path.display()))),
                    Err(err) => {
                        slog::warn!(args.logger, "Failed to stat {:?}: {}", path, err);
                        Ok(Reply::new(ReplyCode::FileError, "Could not get file status"))
                    }
                }
            }
        }
    }
}
