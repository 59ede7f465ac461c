pub mod create_channel;
pub mod delete_channel;
pub mod update_channel;

use duroxide::DurableOutput;
use serde::de::DeserializeOwned;

/// Decode one branch of a `ctx.join`. Activity failures keep their wire text.
pub(crate) fn activity_output<T: DeserializeOwned>(output: Option<DurableOutput>) -> Result<T, String> {
    match output {
        Some(DurableOutput::Activity(Ok(json))) => serde_json::from_str(&json)
            .map_err(|e| format!("Failed to decode activity output: {}", e)),
        Some(DurableOutput::Activity(Err(e))) => Err(e),
        Some(_) => Err("Expected an activity completion".to_string()),
        None => Err("Missing activity completion".to_string()),
    }
}
