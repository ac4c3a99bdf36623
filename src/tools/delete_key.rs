use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteKeyParams {
    #[schemars(description = "Key identifier to delete. Deleting a missing key succeeds.")]
    pub key_id: String,
}
