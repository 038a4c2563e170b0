//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's password. This
// command must be immediately preceded by the user name command.

use crate::{
    auth::UserDetail,
    server::{
        controlchan::{
            command::Password,
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

pub struct Pass {
    password: Password,
}

impl Pass {
    pub fn new(password: Password) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Pass
where
    Storage: FileSystem + 'static,
    User: UserDetail + 'static,
{
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::WaitPass => {
                let username = match session.username.clone() {
                    Some(username) => username,
                    None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Login with USER first")),
                };
                match args.authenticator.authenticate(&username, self.password.as_str()).await {
                    Ok(user) => {
                        slog::info!(args.logger, "User {} logged in", user);
                        session.user = Arc::new(Some(user));
                        session.state = SessionState::WaitCmd;
                        Ok(Reply::new(ReplyCode::UserLoggedIn, "Password ok, continue"))
                    }
                    Err(err) => {
                        slog::warn!(args.logger, "Failed login attempt for user {}: {}", username, err);
                        // RFC 959 wants a fresh USER before the next try.
                        session.username = None;
                        session.user = Arc::new(None);
                        session.state = SessionState::New;
                        Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"))
                    }
                }
            }
            SessionState::New => Ok(Reply::new(ReplyCode::BadCommandSequence, "Login with USER first")),
            SessionState::WaitCmd => Ok(Reply::new(ReplyCode::BadCommandSequence, "Already logged in")),
        }
    }
}
