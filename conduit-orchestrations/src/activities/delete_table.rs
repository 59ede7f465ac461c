use std::sync::Arc;

use duroxide::ActivityContext;

use crate::activity_types::{DeleteTableInput, DeleteTableOutput};
use crate::error::{ChannelError, CloudError};
use crate::topology::ChannelServices;

pub async fn delete_table_activity(
    ctx: ActivityContext,
    services: Arc<ChannelServices>,
    input: DeleteTableInput,
) -> Result<DeleteTableOutput, String> {
    ctx.trace_info(format!("Deleting table {}", input.table_arn));

    match services.tables.delete_table(&input.table_arn).await {
        Ok(()) => Ok(DeleteTableOutput { deleted: true }),
        Err(CloudError::NotFound { .. }) => {
            ctx.trace_info("Table not found, skipping");
            Ok(DeleteTableOutput { deleted: false })
        }
        Err(e) => Err(ChannelError::remote("delete-table")(e).into()),
    }
}
