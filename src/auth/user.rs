use std::fmt::{Debug, Display};

/// Account details for a successfully authenticated user.
///
/// Implementations can carry whatever the storage or permission backends
/// need to know about the user. The server itself only logs it.
pub trait UserDetail: Send + Sync + Debug + Display + 'static {}

/// A user with no details at all.
#[derive(Debug, PartialEq, Eq)]
pub struct DefaultUser;

impl UserDetail for DefaultUser {}

impl Display for DefaultUser {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "DefaultUser")
    }
}
