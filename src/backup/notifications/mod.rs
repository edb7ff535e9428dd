use crate::backup::result_error::result::Result;

pub mod discord;

/// Delivers a plain text status message to some external channel.
pub trait Notification {
    fn send(&self, msg: &str) -> Result<()>;
}
