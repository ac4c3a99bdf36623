use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct KeyExistsParams {
    #[schemars(description = "Key identifier to check")]
    pub key_id: String,
}
