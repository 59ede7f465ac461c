//! Resource naming conventions for a channel
//!
//! Physical resource names are derived from the alias the channel was
//! created with and never change afterwards.

use crate::cloud::{KeyAttribute, SecondaryIndex, StreamView, TableSpec};
use crate::error::ChannelError;

pub const MAX_ALIAS_LEN: usize = 64;

pub const ACCOUNT_CONTENT_INDEX: &str = "AccountContent";

pub fn table_name(alias: &str) -> String {
    format!("{}Table", alias)
}

pub fn queue_name(alias: &str) -> String {
    format!("{}ChannelQueue", alias)
}

pub fn endpoint_topic_name(alias: &str) -> String {
    format!("{}EndpointTopic", alias)
}

/// Check that an alias can be embedded in every derived resource name
pub fn validate_alias(alias: &str) -> Result<(), ChannelError> {
    if alias.is_empty() {
        return Err(ChannelError::Validation("channel name must not be empty".to_string()));
    }
    if alias.len() > MAX_ALIAS_LEN {
        return Err(ChannelError::Validation(format!(
            "channel name '{}' exceeds {} characters",
            alias, MAX_ALIAS_LEN
        )));
    }
    if let Some(bad) = alias.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        return Err(ChannelError::Validation(format!(
            "channel name '{}' contains invalid character '{}'",
            alias, bad
        )));
    }
    Ok(())
}

/// Table storing a channel's messages: account + timestamp key, with an
/// account + content index for alternate queries
pub fn channel_table_spec(alias: &str) -> TableSpec {
    TableSpec {
        name: table_name(alias),
        partition_key: KeyAttribute::number("account"),
        sort_key: KeyAttribute::number("timestamp"),
        secondary_indexes: vec![SecondaryIndex {
            name: ACCOUNT_CONTENT_INDEX.to_string(),
            partition_key: KeyAttribute::number("account"),
            sort_key: KeyAttribute::string("content"),
        }],
        pay_per_request: true,
        stream: Some(StreamView::NewAndOldImages),
    }
}

/// Resource policy letting the notification service deliver into a queue
pub fn queue_delivery_policy() -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": "sqs:SendMessage",
            "Resource": "*",
            "Principal": { "Service": ["sns.amazonaws.com"] }
        }]
    })
    .to_string()
}

/// Last segment of an ARN or URL (`.../name`, `...:name`)
pub fn resource_name(reference: &str) -> &str {
    reference
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        assert_eq!(table_name("sports"), "sportsTable");
        assert_eq!(queue_name("sports"), "sportsChannelQueue");
        assert_eq!(endpoint_topic_name("sports"), "sportsEndpointTopic");
    }

    #[test]
    fn test_validate_alias() {
        assert!(validate_alias("sports_2024-a").is_ok());
        assert!(validate_alias("").is_err());
        assert!(validate_alias("has space").is_err());
        assert!(validate_alias("dots.are.bad").is_err());
        assert!(validate_alias(&"x".repeat(MAX_ALIAS_LEN + 1)).is_err());
    }

    #[test]
    fn test_resource_name_from_references() {
        assert_eq!(
            resource_name("arn:aws:sqs:ap-southeast-2:000000000000:sportsChannelQueue"),
            "sportsChannelQueue"
        );
        assert_eq!(
            resource_name("arn:aws:dynamodb:ap-southeast-2:000000000000:table/sportsTable"),
            "sportsTable"
        );
        assert_eq!(resource_name("plain"), "plain");
    }

    #[test]
    fn test_channel_table_spec_keys() {
        let spec = channel_table_spec("news");
        assert_eq!(spec.partition_key.name, "account");
        assert_eq!(spec.sort_key.name, "timestamp");
        assert_eq!(spec.secondary_indexes[0].name, ACCOUNT_CONTENT_INDEX);
        assert_eq!(spec.secondary_indexes[0].sort_key.name, "content");
    }

    #[test]
    fn test_queue_policy_is_json() {
        let policy: serde_json::Value = serde_json::from_str(&queue_delivery_policy()).unwrap();
        assert_eq!(policy["Statement"][0]["Action"], "sqs:SendMessage");
    }
}
