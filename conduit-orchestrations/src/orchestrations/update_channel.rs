//! Rename channel orchestration
//!
//! Only renames run as a workflow; unsupported actions are answered before
//! one is started.

use duroxide::OrchestrationContext;

use crate::activity_names::activities;
use crate::activity_types::{
    CheckAliasAvailableInput, CheckAliasAvailableOutput, ResolveChannelInput,
    ResolveChannelOutput, UpdateChannelAliasInput, UpdateChannelAliasOutput,
    UpdateFilterPolicyInput, UpdateFilterPolicyOutput,
};
use crate::naming::validate_alias;
use crate::types::{UpdateChannelInput, UpdateChannelOutput};

pub async fn update_channel_orchestration(
    ctx: OrchestrationContext,
    input: UpdateChannelInput,
) -> Result<UpdateChannelOutput, String> {
    ctx.trace_info(format!(
        "Renaming channel {} to '{}' (orchestration: {})",
        input.key, input.alias, input.orchestration_id
    ));

    validate_alias(&input.alias)?;

    let mut channel = ctx
        .schedule_activity_typed::<ResolveChannelInput, ResolveChannelOutput>(
            activities::registry::RESOLVE_CHANNEL,
            &ResolveChannelInput { key: input.key.clone() },
        )
        .into_activity_typed::<ResolveChannelOutput>()
        .await?
        .channel;

    let alias = input.alias;
    if channel.alias == alias {
        ctx.trace_info(format!("Channel {} is already named '{}'", channel.id, alias));
        return Ok(UpdateChannelOutput {
            channel: Some(channel),
            applied: false,
        });
    }

    ctx.schedule_activity_typed::<CheckAliasAvailableInput, CheckAliasAvailableOutput>(
        activities::registry::CHECK_ALIAS_AVAILABLE,
        &CheckAliasAvailableInput {
            alias: alias.clone(),
            owner_id: Some(channel.id),
        },
    )
    .into_activity_typed::<CheckAliasAvailableOutput>()
    .await?;

    // Step 1: registry alias
    ctx.schedule_activity_typed::<UpdateChannelAliasInput, UpdateChannelAliasOutput>(
        activities::registry::UPDATE_CHANNEL_ALIAS,
        &UpdateChannelAliasInput {
            id: channel.id,
            alias: alias.clone(),
        },
    )
    .into_activity_typed::<UpdateChannelAliasOutput>()
    .await?;

    // Step 2: routing filter; on failure put the old alias back
    let filter = ctx
        .schedule_activity_typed::<UpdateFilterPolicyInput, UpdateFilterPolicyOutput>(
            activities::UPDATE_FILTER_POLICY,
            &UpdateFilterPolicyInput {
                subscription_arn: channel.subscription_arn.clone(),
                alias: alias.clone(),
            },
        )
        .into_activity_typed::<UpdateFilterPolicyOutput>()
        .await;

    if let Err(e) = filter {
        ctx.trace_warn(format!(
            "Filter update failed, restoring alias '{}': {}",
            channel.alias, e
        ));

        let revert = ctx
            .schedule_activity_typed::<UpdateChannelAliasInput, UpdateChannelAliasOutput>(
                activities::registry::UPDATE_CHANNEL_ALIAS,
                &UpdateChannelAliasInput {
                    id: channel.id,
                    alias: channel.alias.clone(),
                },
            )
            .into_activity_typed::<UpdateChannelAliasOutput>()
            .await;
        if let Err(revert_err) = revert {
            ctx.trace_error(format!(
                "Could not restore alias of channel {}: {}",
                channel.id, revert_err
            ));
        }
        return Err(e);
    }

    ctx.trace_info(format!(
        "Channel {} renamed '{}' -> '{}' (table keeps its original name)",
        channel.id, channel.alias, alias
    ));
    channel.alias = alias;

    Ok(UpdateChannelOutput {
        channel: Some(channel),
        applied: true,
    })
}
