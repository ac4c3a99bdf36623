use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QueryMemoriesParams {
    #[schemars(description = "Case-insensitive substring to match against content and tags. Empty matches everything.")]
    pub query: String,

    #[schemars(description = "Maximum number of memories to return. Defaults to 50.")]
    pub limit: Option<usize>,

    #[schemars(description = "Exact-match filters: key 'tag' matches a tag, any other key matches metadata[key]")]
    pub filters: Option<HashMap<String, String>>,
}
