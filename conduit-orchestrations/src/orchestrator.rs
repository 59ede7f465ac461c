//! Entry point used by the server: one method per lifecycle operation
//!
//! Each operation starts a durable workflow instance and waits for it to
//! finish. Workflow failures come back as text and are turned into a
//! [`ChannelError`] with the kind they were raised with.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use conduit_models::{Channel, ChannelRequest};
use duroxide::providers::Provider;
use duroxide::runtime::{Runtime, RuntimeOptions};
use duroxide::{Client, OrchestrationStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ChannelError, Result};
use crate::names::orchestrations;
use crate::naming::validate_alias;
use crate::registry::{create_activity_registry, create_orchestration_registry};
use crate::topology::ChannelServices;
use crate::types::{
    ChannelAction, ChannelKey, CreateChannelInput, CreateChannelOutput, DeleteChannelInput,
    DeleteChannelOutput, UpdateChannelInput, UpdateChannelOutput,
};

pub const DEFAULT_WAIT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ChannelOrchestrator {
    runtime: Arc<Runtime>,
    client: Arc<Client>,
    services: Arc<ChannelServices>,
    wait: Duration,
}

impl ChannelOrchestrator {
    /// Start the workflow runtime over `store` with every activity bound to `services`
    pub async fn start<P>(store: Arc<P>, services: Arc<ChannelServices>) -> Self
    where
        P: Provider + 'static,
    {
        let activities = Arc::new(create_activity_registry(services.clone()));
        let orchestrations = create_orchestration_registry();

        let mut runtime_options = RuntimeOptions::default();
        runtime_options.worker_lock_timeout = Duration::from_secs(300);

        tracing::info!("Starting workflow runtime");
        let runtime =
            Runtime::start_with_options(store.clone(), activities, orchestrations, runtime_options)
                .await;
        let client = Arc::new(Client::new(store));

        Self {
            runtime,
            client,
            services,
            wait: DEFAULT_WAIT,
        }
    }

    /// How long a caller waits for a workflow before giving up on it
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn services(&self) -> &Arc<ChannelServices> {
        &self.services
    }

    pub async fn shutdown(&self) {
        tracing::info!("Stopping workflow runtime");
        self.runtime.clone().shutdown(None).await;
    }

    pub async fn create_channel(&self, alias: &str) -> Result<Channel> {
        let instance_id = instance_id("create");
        let input = CreateChannelInput {
            alias: alias.to_string(),
            fan_out_topic_arn: self.services.topology.fan_out_topic_arn.clone(),
            worker_parameter: self.services.topology.worker_parameter.clone(),
            orchestration_id: instance_id.clone(),
        };
        let output: CreateChannelOutput = self
            .run(orchestrations::CREATE_CHANNEL, &instance_id, &input)
            .await?;
        Ok(output.channel)
    }

    /// Returns the removed registry row
    pub async fn delete_channel(&self, key: ChannelKey) -> Result<Channel> {
        let instance_id = instance_id("delete");
        let input = DeleteChannelInput {
            key,
            worker_parameter: self.services.topology.worker_parameter.clone(),
            orchestration_id: instance_id.clone(),
        };
        let output: DeleteChannelOutput = self
            .run(orchestrations::DELETE_CHANNEL, &instance_id, &input)
            .await?;
        Ok(output.channel)
    }

    /// Parse and apply an action. Malformed actions fail before any lookup;
    /// unsupported ones are ignored without touching the registry.
    pub async fn update_channel(
        &self,
        key: ChannelKey,
        request: &ChannelRequest,
    ) -> Result<UpdateChannelOutput> {
        let alias = match ChannelAction::parse(request)? {
            ChannelAction::Rename { alias } => alias,
            ChannelAction::Unsupported(tag) => {
                tracing::info!("Ignoring unsupported action '{}' for channel {}", tag, key);
                return Ok(UpdateChannelOutput {
                    channel: None,
                    applied: false,
                });
            }
        };

        validate_alias(&alias)?;

        let instance_id = instance_id("update");
        let input = UpdateChannelInput {
            key,
            alias,
            orchestration_id: instance_id.clone(),
        };
        self.run(orchestrations::UPDATE_CHANNEL, &instance_id, &input)
            .await
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>> {
        Ok(self.services.registry.list().await?)
    }

    async fn run<I, O>(&self, orchestration: &str, instance_id: &str, input: &I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let input_json = serde_json::to_string(input)
            .map_err(|e| ChannelError::runtime(format!("Failed to encode input: {}", e)))?;

        tracing::debug!("Starting {} as {}", orchestration, instance_id);
        self.client
            .start_orchestration(instance_id, orchestration, input_json)
            .await
            .map_err(|e| ChannelError::runtime(format!("Failed to start {}: {}", instance_id, e)))?;

        let status = self
            .client
            .wait_for_orchestration(instance_id, self.wait)
            .await
            .map_err(|e| {
                ChannelError::runtime(format!("Gave up waiting for {}: {:?}", instance_id, e))
            })?;

        match status {
            OrchestrationStatus::Completed { output, .. } => serde_json::from_str(&output)
                .map_err(|e| ChannelError::runtime(format!("Failed to decode output: {}", e))),
            OrchestrationStatus::Failed { details, .. } => {
                let err = reported_failure(&details);
                tracing::warn!("{} failed: {}", instance_id, err);
                Err(err)
            }
            other => Err(ChannelError::runtime(format!(
                "{} did not finish: {:?}",
                instance_id, other
            ))),
        }
    }
}

fn instance_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Failure details carry the workflow's error text as a quoted field
fn reported_failure(details: &impl Debug) -> ChannelError {
    let text = format!("{:?}", details);
    match ChannelError::from_wire(&text) {
        ChannelError::Reported { kind, message } if message != text => ChannelError::Reported {
            kind,
            message: message.split('"').next().unwrap_or_default().to_string(),
        },
        other => other,
    }
}
