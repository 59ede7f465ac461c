use std::sync::Arc;

use conduit_models::{
    Channel, Envelope, MessageAttribute, MessageAttributes, MessageRecord, ACCOUNT_ATTRIBUTE,
    CHANNEL_ATTRIBUTE, TIMESTAMP_ATTRIBUTE,
};

use super::parse_number;
use crate::error::{ChannelError, Result};
use crate::naming::resource_name;
use crate::topology::ChannelServices;

/// Outcome of draining one or more queues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub relayed: usize,
    pub failed: usize,
}

impl RelayReport {
    fn absorb(&mut self, other: RelayReport) {
        self.relayed += other.relayed;
        self.failed += other.failed;
    }
}

/// Persists routed messages into their channel's table and republishes
/// them on the channel's endpoint topic
#[derive(Clone)]
pub struct MessageRelay {
    services: Arc<ChannelServices>,
}

impl MessageRelay {
    pub fn new(services: Arc<ChannelServices>) -> Self {
        Self { services }
    }

    /// Relay one delivered envelope. Returns the endpoint publish id.
    pub async fn handle(&self, envelope: &Envelope) -> Result<String> {
        let alias = envelope.attribute(CHANNEL_ATTRIBUTE).ok_or_else(|| {
            ChannelError::Validation(format!("message {} has no channel attribute", envelope.message_id))
        })?;
        let account = parse_number(
            ACCOUNT_ATTRIBUTE,
            envelope.attribute(ACCOUNT_ATTRIBUTE).unwrap_or_default(),
        )?;
        let timestamp = parse_number(
            TIMESTAMP_ATTRIBUTE,
            envelope.attribute(TIMESTAMP_ATTRIBUTE).unwrap_or_default(),
        )?;

        // Table and topic come from the registry so renamed channels still resolve
        let channel = self.channel_for(alias).await?;

        let record = MessageRecord {
            channel: alias.to_string(),
            account,
            timestamp,
            content: envelope.message.clone(),
        };
        self.services
            .tables
            .put_item(&channel.table_arn, &record)
            .await
            .map_err(ChannelError::remote("relay-put-item"))?;

        let mut attributes = MessageAttributes::new();
        attributes.insert(ACCOUNT_ATTRIBUTE.to_string(), MessageAttribute::number(account));
        attributes.insert(TIMESTAMP_ATTRIBUTE.to_string(), MessageAttribute::number(timestamp));

        let message_id = self
            .services
            .topics
            .publish(&channel.endpoint_topic_arn, &record.content, &attributes)
            .await
            .map_err(ChannelError::remote("relay-publish"))?;

        tracing::debug!(
            channel = %alias,
            channel_id = channel.id,
            account,
            timestamp,
            "Message relayed"
        );
        Ok(message_id)
    }

    /// Drain up to `max` messages from one queue. Bad records are logged
    /// and skipped; only a failed receive is an error.
    pub async fn process_queue(&self, queue_url: &str, max: usize) -> Result<RelayReport> {
        let messages = self
            .services
            .queues
            .receive_messages(queue_url, max)
            .await
            .map_err(ChannelError::remote("relay-receive"))?;

        let mut report = RelayReport::default();
        for message in messages {
            let outcome = match serde_json::from_str::<Envelope>(&message.body) {
                Ok(envelope) => self.handle(&envelope).await.map(|_| ()),
                Err(e) => Err(ChannelError::Validation(format!("undecodable envelope: {}", e))),
            };

            match outcome {
                Ok(()) => report.relayed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        queue_url = %queue_url,
                        message_id = %message.message_id,
                        error = %e,
                        "Failed to relay message"
                    );
                }
            }
        }
        Ok(report)
    }

    /// Drain every queue bound to the message worker
    pub async fn poll_bound_queues(&self, max_per_queue: usize) -> Result<RelayReport> {
        let function = self
            .services
            .parameters
            .get_parameter(&self.services.topology.worker_parameter)
            .await
            .map_err(ChannelError::remote("relay-resolve-worker"))?;

        let mappings = self
            .services
            .bindings
            .list_event_source_mappings(&function)
            .await
            .map_err(ChannelError::remote("relay-list-bindings"))?;

        let mut report = RelayReport::default();
        for mapping in mappings {
            let name = resource_name(&mapping.event_source_arn);
            let queue_url = match self.services.queues.get_queue_url(name).await {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(queue = %name, error = %e, "Bound queue not reachable");
                    continue;
                }
            };
            report.absorb(self.process_queue(&queue_url, max_per_queue).await?);
        }
        Ok(report)
    }

    async fn channel_for(&self, alias: &str) -> Result<Channel> {
        let mut matches = self.services.registry.find_by_alias(alias).await?;
        match matches.len() {
            0 => Err(ChannelError::NotFound(format!("channel '{}' not found", alias))),
            1 => Ok(matches.remove(0)),
            n => Err(ChannelError::Conflict(format!(
                "{} channels share alias '{}'",
                n, alias
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::local_services;

    fn envelope(attributes: &[(&str, MessageAttribute)]) -> Envelope {
        Envelope {
            message_id: "m-1".to_string(),
            topic_arn: "arn:aws:sns:ap-southeast-2:000000000000:metaTopic".to_string(),
            message: "hello".to_string(),
            message_attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_missing_channel_attribute_rejected() {
        let (services, _cloud) = local_services().await;
        let relay = MessageRelay::new(services);

        let err = relay
            .handle(&envelope(&[(ACCOUNT_ATTRIBUTE, MessageAttribute::number(1))]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let (services, _cloud) = local_services().await;
        let relay = MessageRelay::new(services);

        let err = relay
            .handle(&envelope(&[
                (CHANNEL_ATTRIBUTE, MessageAttribute::string("ghost")),
                (ACCOUNT_ATTRIBUTE, MessageAttribute::number(1)),
                (TIMESTAMP_ATTRIBUTE, MessageAttribute::number(2)),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_poll_with_no_bindings_is_empty() {
        let (services, _cloud) = local_services().await;
        let report = MessageRelay::new(services).poll_bound_queues(10).await.unwrap();
        assert_eq!(report, RelayReport::default());
    }
}
