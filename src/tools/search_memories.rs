use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoriesParams {
    #[schemars(description = "Query embedding vector (must match the index dimensionality)")]
    pub query_embedding: Vec<f32>,

    #[schemars(description = "Maximum number of matches to return. Defaults to 10.")]
    pub limit: Option<usize>,

    #[schemars(description = "Minimum cosine similarity in [-1, 1]. Defaults to 0.0.")]
    pub similarity_threshold: Option<f32>,
}
