use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{CheckAliasAvailableInput, CheckAliasAvailableOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn check_alias_available_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: CheckAliasAvailableInput,
) -> Result<CheckAliasAvailableOutput, String> {
    let holders = services
        .registry
        .find_by_alias(&input.alias)
        .await
        .map_err(ChannelError::from)?;

    if let Some(holder) = holders.iter().find(|c| Some(c.id) != input.owner_id) {
        return Err(ChannelError::Conflict(format!(
            "channel name '{}' is already used by channel {}",
            input.alias, holder.id
        ))
        .into());
    }

    ctx.trace_info(format!("Channel name '{}' is free", input.alias));
    Ok(CheckAliasAvailableOutput { available: true })
}
