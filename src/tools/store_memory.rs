use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    #[schemars(description = "The free-text content of the memory")]
    pub content: String,

    #[schemars(description = "Optional string metadata, e.g. {\"category\": \"preference\", \"importance\": \"high\"}")]
    pub metadata: Option<HashMap<String, String>>,

    #[schemars(description = "Optional tags, e.g. [\"ui\", \"python\"]")]
    pub tags: Option<Vec<String>>,
}
