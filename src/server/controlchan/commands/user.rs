//! The RFC 959 User Name (`USER`) command

use crate::{
    auth::UserDetail,
    server::{
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        session::SessionState,
    },
    storage::FileSystem,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl<Storage, UserType> CommandHandler<Storage, UserType> for User
where
    Storage: FileSystem + 'static,
    UserType: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, UserType>) -> Result<Reply, ControlChanError> {
        // USER always (re)stages a login, dropping any current one.
        let mut session = args.session.lock().await;
        session.username = Some(self.username.clone());
        session.user = Arc::new(None);
        session.state = SessionState::WaitPass;
        Ok(Reply::new(ReplyCode::NeedPassword, "User name ok, password required"))
    }
}
