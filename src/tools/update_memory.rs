use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMemoryParams {
    #[schemars(description = "Memory identifier to update")]
    pub memory_id: String,

    #[schemars(description = "Replacement content; the memory is re-embedded")]
    pub content: String,

    #[schemars(description = "Replacement tags. Omit to clear all tags.")]
    pub tags: Option<Vec<String>>,
}
