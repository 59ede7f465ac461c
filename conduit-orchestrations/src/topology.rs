//! Shared resources every channel is wired to, resolved once and injected

use std::sync::Arc;

use crate::cloud::{
    EventBindingService, LocalCloud, ParameterStore, QueueService, TableService, TopicService,
};
use crate::error::{ChannelError, CloudError};
use crate::store::ChannelRegistry;

/// Parameter holding the fan-out topic ARN
pub const FAN_OUT_TOPIC_PARAMETER: &str = "metaTopicARN";
/// Parameter holding the message-processing worker's identifier
pub const WORKER_PARAMETER: &str = "handleMessageQueueARN";

pub const FAN_OUT_TOPIC_NAME: &str = "metaTopic";
pub const WORKER_FUNCTION_NAME: &str = "handleMessageQueue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedTopology {
    /// Topic every channel queue subscribes to
    pub fan_out_topic_arn: String,
    /// Parameter store key of the worker identifier
    pub worker_parameter: String,
}

impl SharedTopology {
    /// Resolve the fan-out topic from an explicit ARN, falling back to the
    /// parameter store. Done once at startup.
    pub async fn resolve(
        explicit_fan_out_arn: Option<String>,
        worker_parameter: Option<String>,
        parameters: &dyn ParameterStore,
    ) -> Result<Self, ChannelError> {
        let fan_out_topic_arn = match explicit_fan_out_arn {
            Some(arn) if !arn.is_empty() => arn,
            _ => parameters
                .get_parameter(FAN_OUT_TOPIC_PARAMETER)
                .await
                .map_err(|e| match e {
                    CloudError::NotFound { .. } => ChannelError::Configuration(format!(
                        "fan-out topic not configured and parameter '{}' is missing",
                        FAN_OUT_TOPIC_PARAMETER
                    )),
                    other => ChannelError::remote("resolve-fan-out-topic")(other),
                })?,
        };

        Ok(Self {
            fan_out_topic_arn,
            worker_parameter: worker_parameter.unwrap_or_else(|| WORKER_PARAMETER.to_string()),
        })
    }
}

/// Everything an orchestration may touch, passed by reference
pub struct ChannelServices {
    pub tables: Arc<dyn TableService>,
    pub queues: Arc<dyn QueueService>,
    pub topics: Arc<dyn TopicService>,
    pub parameters: Arc<dyn ParameterStore>,
    pub bindings: Arc<dyn EventBindingService>,
    pub registry: Arc<dyn ChannelRegistry>,
    pub topology: SharedTopology,
}

impl ChannelServices {
    /// Wire every service to one local cloud
    pub fn local(cloud: LocalCloud, registry: Arc<dyn ChannelRegistry>, topology: SharedTopology) -> Self {
        let cloud = Arc::new(cloud);
        Self {
            tables: cloud.clone(),
            queues: cloud.clone(),
            topics: cloud.clone(),
            parameters: cloud.clone(),
            bindings: cloud,
            registry,
            topology,
        }
    }
}

impl LocalCloud {
    /// Create the fan-out topic and publish the shared parameters
    pub async fn bootstrap_shared(&self) -> Result<String, CloudError> {
        let fan_out_arn = self.create_topic(FAN_OUT_TOPIC_NAME).await?;
        let worker_arn = self.function_arn(WORKER_FUNCTION_NAME);
        self.put_parameter(FAN_OUT_TOPIC_PARAMETER, &fan_out_arn).await;
        self.put_parameter(WORKER_PARAMETER, &worker_arn).await;
        Ok(fan_out_arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_prefers_explicit_arn() {
        let cloud = LocalCloud::default();
        let topology = SharedTopology::resolve(Some("arn:explicit".to_string()), None, &cloud)
            .await
            .unwrap();
        assert_eq!(topology.fan_out_topic_arn, "arn:explicit");
        assert_eq!(topology.worker_parameter, WORKER_PARAMETER);
    }

    #[tokio::test]
    async fn test_resolve_from_parameter_store() {
        let cloud = LocalCloud::default();
        let fan_out = cloud.bootstrap_shared().await.unwrap();
        let topology = SharedTopology::resolve(None, None, &cloud).await.unwrap();
        assert_eq!(topology.fan_out_topic_arn, fan_out);
    }

    #[tokio::test]
    async fn test_resolve_missing_parameter_is_configuration_error() {
        let cloud = LocalCloud::default();
        let err = SharedTopology::resolve(None, None, &cloud).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
