//! Satellites of the lifecycle core: the publisher feeding the fan-out
//! topic and the relay draining channel queues into tables.

mod publisher;
mod relay;

pub use publisher::MessagePublisher;
pub use relay::{MessageRelay, RelayReport};

use crate::error::{ChannelError, Result};

/// Accounts and timestamps travel as decimal strings
fn parse_number(field: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        ChannelError::Validation(format!("{} must be an integer, got '{}'", field, value))
    })
}
