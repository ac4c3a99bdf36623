use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetMemoryParams {
    #[schemars(description = "Memory identifier returned by store_memory")]
    pub memory_id: String,
}
