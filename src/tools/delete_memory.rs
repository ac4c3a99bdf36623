use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteMemoryParams {
    #[schemars(description = "Memory identifier to delete. Deleting a missing memory succeeds.")]
    pub memory_id: String,
}
