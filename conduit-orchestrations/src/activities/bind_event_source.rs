use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{BindEventSourceInput, BindEventSourceOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn bind_event_source_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: BindEventSourceInput,
) -> Result<BindEventSourceOutput, String> {
    ctx.trace_info(format!("Binding {} to {}", input.queue_arn, input.function));

    let mapping_uuid = services
        .bindings
        .create_event_source_mapping(&input.queue_arn, &input.function)
        .await
        .map_err(ChannelError::creating("bind-event-source"))?;

    Ok(BindEventSourceOutput { mapping_uuid })
}
