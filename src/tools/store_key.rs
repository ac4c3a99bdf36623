use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreKeyParams {
    #[schemars(description = "Caller-chosen unique key identifier, e.g. 'alice@example.org'")]
    pub key_id: String,

    #[schemars(description = "Secret bytes to encrypt and store")]
    pub key_data: Vec<u8>,

    #[schemars(description = "Optional string metadata stored alongside the secret")]
    pub metadata: Option<HashMap<String, String>>,
}
