use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{CreateTableInput, CreateTableOutput};
use crate::error::ChannelError;
use crate::naming::channel_table_spec;
use crate::topology::ChannelServices;

pub async fn create_table_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: CreateTableInput,
) -> Result<CreateTableOutput, String> {
    let spec = channel_table_spec(&input.alias);
    ctx.trace_info(format!("Creating table {}", spec.name));

    let table = services
        .tables
        .create_table(&spec)
        .await
        .map_err(ChannelError::creating("create-table"))?;

    ctx.trace_info(format!("Table created: {}", table.arn));
    Ok(CreateTableOutput {
        table_name: table.name,
        table_arn: table.arn,
    })
}
