use std::sync::Arc;

use conduit_models::FilterPolicy;
use duroxide::ActivityContext;

use crate::activity_types::{UpdateFilterPolicyInput, UpdateFilterPolicyOutput};
use crate::error::ChannelError;
use crate::topology::ChannelServices;

pub async fn update_filter_policy_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: UpdateFilterPolicyInput,
) -> Result<UpdateFilterPolicyOutput, String> {
    let filter = FilterPolicy::for_channel(&input.alias);
    ctx.trace_info(format!(
        "Setting filter {} on {}",
        filter.to_json(),
        input.subscription_arn
    ));

    services
        .topics
        .set_filter_policy(&input.subscription_arn, &filter)
        .await
        .map_err(ChannelError::remote("update-filter-policy"))?;

    Ok(UpdateFilterPolicyOutput { updated: true })
}
