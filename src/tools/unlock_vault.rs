use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UnlockVaultParams {
    #[schemars(description = "Session passphrase used to derive the vault master key")]
    pub passphrase: String,
}
