use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{UpdateChannelAliasInput, UpdateChannelAliasOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn update_channel_alias_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: UpdateChannelAliasInput,
) -> Result<UpdateChannelAliasOutput, String> {
    let updated = services
        .registry
        .update_alias(input.id, &input.alias)
        .await
        .map_err(ChannelError::from)?;

    if !updated {
        return Err(ChannelError::NotFound(format!("channel id {} not found", input.id)).into());
    }

    ctx.trace_info(format!("Channel {} alias set to '{}'", input.id, input.alias));
    Ok(UpdateChannelAliasOutput { updated })
}
