use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{ResolveWorkerInput, ResolveWorkerOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn resolve_worker_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: ResolveWorkerInput,
) -> Result<ResolveWorkerOutput, String> {
    let function = services
        .parameters
        .get_parameter(&input.parameter)
        .await
        .map_err(|e| match e {
            CloudError::NotFound { .. } => ChannelError::Configuration(format!(
                "worker parameter '{}' is not set",
                input.parameter
            )),
            other => ChannelError::remote("resolve-worker")(other),
        })?;

    ctx.trace_info(format!("Message worker: {}", function));
    Ok(ResolveWorkerOutput { function })
}
