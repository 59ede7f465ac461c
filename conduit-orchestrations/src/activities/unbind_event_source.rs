use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{UnbindEventSourceInput, UnbindEventSourceOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn unbind_event_source_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: UnbindEventSourceInput,
) -> Result<UnbindEventSourceOutput, String> {
    ctx.trace_info(format!("Removing event source mapping {}", input.mapping_uuid));

    match services.bindings.delete_event_source_mapping(&input.mapping_uuid).await {
        Ok(()) => Ok(UnbindEventSourceOutput { removed: true }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info("Event source mapping not found, skipping");
            Ok(UnbindEventSourceOutput { removed: false })
        }
        Err(e) => Err(ChannelError::remote("unbind-event-source")(e).into()),
    }
}
