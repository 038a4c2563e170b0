use super::{command::Command, error::ControlChanError, event::Event, middleware::ControlChanMiddleware, Reply, ReplyCode};
use crate::{
    auth::UserDetail,
    server::session::{SessionState, SharedSession},
    storage::FileSystem,
};
use async_trait::async_trait;

// Enforces the login gate: apart from a handful of pre-auth commands,
// everything requires a completed USER/PASS exchange.
pub struct AuthMiddleware<Storage, User, Next>
where
    Storage: FileSystem,
    User: UserDetail,
    Next: ControlChanMiddleware,
{
    pub session: SharedSession<Storage, User>,
    pub next: Next,
}

#[async_trait]
impl<Storage, User, Next> ControlChanMiddleware for AuthMiddleware<Storage, User, Next>
where
    Storage: FileSystem + 'static,
    User: UserDetail,
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        match &event {
            Event::Command(cmd) if !is_login_exempt(cmd) => {
                let authenticated = { self.session.lock().await.state == SessionState::WaitCmd };
                if authenticated {
                    self.next.handle(event).await
                } else {
                    Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate"))
                }
            }
            _ => self.next.handle(event).await,
        }
    }
}

fn is_login_exempt(cmd: &Command) -> bool {
    matches!(
        cmd,
        Command::User { .. } | Command::Pass { .. } | Command::Auth { .. } | Command::Feat | Command::Quit | Command::Noop | Command::Syst
    )
}
