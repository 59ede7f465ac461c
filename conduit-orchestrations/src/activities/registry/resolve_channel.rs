use std::sync::Arc;

use conduit_models::Channel;
use duroxide::ActivityContext;

use crate::activity_types::{ResolveChannelInput, ResolveChannelOutput};
use crate::error::{ChannelError, Result};
use crate::topology::ChannelServices;
use crate::types::ChannelKey;

pub async fn resolve_channel_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: ResolveChannelInput,
) -> std::result::Result<ResolveChannelOutput, String> {
    let channel = resolve(&services, &input.key).await?;

    ctx.trace_info(format!("Resolved {} to channel {}", input.key, channel.id));
    Ok(ResolveChannelOutput { channel })
}

/// Look a channel up by id, or by alias when exactly one row holds it
pub(crate) async fn resolve(services: &ChannelServices, key: &ChannelKey) -> Result<Channel> {
    let registry = &services.registry;

    match key {
        ChannelKey::Id(id) => registry
            .get(*id)
            .await?
            .ok_or_else(|| ChannelError::NotFound(format!("channel {} not found", key))),
        ChannelKey::Alias(alias) => {
            let mut matches = registry.find_by_alias(alias).await?;
            match matches.len() {
                0 => Err(ChannelError::NotFound(format!("channel {} not found", key))),
                1 => Ok(matches.remove(0)),
                n => {
                    let ids: Vec<String> = matches.iter().map(|c| c.id.to_string()).collect();
                    Err(ChannelError::Conflict(format!(
                        "{} channels share alias '{}' (ids {}); use an id",
                        n,
                        alias,
                        ids.join(", ")
                    )))
                }
            }
        }
    }
}
