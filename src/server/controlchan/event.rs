use super::command::Command;
use crate::server::chancomms::ControlChanMsg;

// An event happening on the control channel: either a command arriving from
// the client or a message from one of our own tasks.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    InternalMsg(ControlChanMsg),
}
