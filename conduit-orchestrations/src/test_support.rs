use std::sync::Arc;

use conduit_models::Channel;

use crate::cloud::LocalCloud;
use crate::store::MemoryRegistry;
use crate::topology::{ChannelServices, SharedTopology};

/// Services over a bootstrapped local cloud and an empty in-memory registry
pub(crate) async fn local_services() -> (Arc<ChannelServices>, LocalCloud) {
    let cloud = LocalCloud::default();
    let fan_out_topic_arn = cloud.bootstrap_shared().await.unwrap();
    let topology = SharedTopology::resolve(Some(fan_out_topic_arn), None, &cloud)
        .await
        .unwrap();
    let services = ChannelServices::local(cloud.clone(), Arc::new(MemoryRegistry::new()), topology);
    (Arc::new(services), cloud)
}

pub(crate) fn sample_channel(id: i64, alias: &str) -> Channel {
    Channel {
        id,
        alias: alias.to_string(),
        table_arn: format!("arn:table/{}", id),
        queue_arn: format!("arn:queue:{}", id),
        endpoint_topic_arn: format!("arn:topic:{}", id),
        subscription_arn: format!("arn:sub:{}", id),
    }
}
