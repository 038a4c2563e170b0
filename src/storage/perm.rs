use super::Result;
use std::fmt::Debug;
use std::path::Path;

/// The permission oracle consulted when rendering `LIST` output.
///
/// Mode, owner and group are presentation-level concepts here; nothing in the
/// engine enforces them. A single instance is shared by all sessions.
pub trait Perm: Send + Sync + Debug {
    /// The 9-bit POSIX permission set for the given path.
    fn mode(&self, path: &Path) -> Result<u32>;

    /// The owner name shown for the given path.
    fn owner(&self, path: &Path) -> Result<String>;

    /// The group name shown for the given path.
    fn group(&self, path: &Path) -> Result<String>;
}

/// A [`Perm`] that answers the same owner, group and mode for every path.
#[derive(Debug)]
pub struct SimplePerm {
    owner: String,
    group: String,
}

impl SimplePerm {
    /// Creates a `SimplePerm` advertising the given owner and group.
    pub fn new<T: Into<String>>(owner: T, group: T) -> Self {
        SimplePerm {
            owner: owner.into(),
            group: group.into(),
        }
    }
}

impl Default for SimplePerm {
    fn default() -> Self {
        SimplePerm::new("root", "root")
    }
}

impl Perm for SimplePerm {
    fn mode(&self, _path: &Path) -> Result<u32> {
        Ok(0o644)
    }

    fn owner(&self, _path: &Path) -> Result<String> {
        Ok(self.owner.clone())
    }

    fn group(&self, _path: &Path) -> Result<String> {
        Ok(self.group.clone())
    }
}
