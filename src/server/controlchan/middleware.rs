use super::{error::ControlChanError, event::Event, Reply};
use async_trait::async_trait;

// Links in the chain of event handlers the control loop pushes every event
// through.
#[async_trait]
pub trait ControlChanMiddleware: Send + Sync {
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError>;
}
