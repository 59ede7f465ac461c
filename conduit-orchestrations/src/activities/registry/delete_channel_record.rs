use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{DeleteChannelRecordInput, DeleteChannelRecordOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn delete_channel_record_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: DeleteChannelRecordInput,
) -> Result<DeleteChannelRecordOutput, String> {
    let deleted = services
        .registry
        .remove(input.id)
        .await
        .map_err(ChannelError::from)?;

    if deleted {
        ctx.trace_info(format!("Registry row {} removed", input.id));
    } else {
        ctx.trace_warn(format!("Registry row {} was already gone", input.id));
    }

    Ok(DeleteChannelRecordOutput { deleted })
}
