use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveKeyParams {
    #[schemars(description = "Key identifier to decrypt and return")]
    pub key_id: String,
}
