//! Input and output types for Conduit orchestrations

use std::fmt;

use conduit_models::{Channel, ChannelRequest};
use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, Result};

/// Action tag understood by the update operation
pub const CHANGE_CHANNEL_NAME: &str = "ChangeChannelName";

/// Parameter key carrying the new alias
pub const NAME_PARAMETER: &str = "name";

/// How a caller refers to an existing channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKey {
    Id(i64),
    Alias(String),
}

impl ChannelKey {
    /// Numeric references are ids, anything else is an alias
    pub fn from_reference(reference: &str) -> Self {
        match reference.trim().parse::<i64>() {
            Ok(id) => ChannelKey::Id(id),
            Err(_) => ChannelKey::Alias(reference.to_string()),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Id(id) => write!(f, "id {}", id),
            ChannelKey::Alias(alias) => write!(f, "alias '{}'", alias),
        }
    }
}

// ============================================================================
// Create Channel Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateChannelInput {
    /// Channel alias, also the root of every resource name
    pub alias: String,
    /// Topic the channel queue subscribes to
    pub fan_out_topic_arn: String,
    /// Parameter store key of the worker identifier
    pub worker_parameter: String,
    /// Unique orchestration/request identifier
    pub orchestration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateChannelOutput {
    pub channel: Channel,
    /// Time taken to provision (milliseconds)
    pub provisioning_ms: u64,
}

// ============================================================================
// Delete Channel Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteChannelInput {
    pub key: ChannelKey,
    pub worker_parameter: String,
    pub orchestration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteChannelOutput {
    /// The record as it was before deletion
    pub channel: Channel,
}

// ============================================================================
// Update Channel Orchestration
// ============================================================================

/// A parsed update action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    Rename { alias: String },
    /// Any tag this service does not handle; accepted and ignored
    Unsupported(String),
}

impl ChannelAction {
    pub fn parse(request: &ChannelRequest) -> Result<Self> {
        if request.action != CHANGE_CHANNEL_NAME {
            return Ok(ChannelAction::Unsupported(request.action.clone()));
        }

        if request.parameters.len() != 1 {
            return Err(ChannelError::Validation(format!(
                "{} takes exactly one parameter object, got {}",
                CHANGE_CHANNEL_NAME,
                request.parameters.len()
            )));
        }

        let alias = request.parameters[0].get(NAME_PARAMETER).ok_or_else(|| {
            ChannelError::Validation(format!(
                "{} requires a '{}' parameter",
                CHANGE_CHANNEL_NAME, NAME_PARAMETER
            ))
        })?;

        Ok(ChannelAction::Rename { alias: alias.clone() })
    }
}

/// Input of the rename workflow; other actions never start one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChannelInput {
    pub key: ChannelKey,
    /// New alias, already validated
    pub alias: String,
    pub orchestration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChannelOutput {
    /// The record after the update; None when the action was ignored
    /// without a lookup
    pub channel: Option<Channel>,
    /// False when the action was ignored
    pub applied: bool,
}
