use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[schema(example = "image/png")]
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub key: String,
    pub upload_url: String,
    pub public_url: String,
    /// Seconds the upload URL stays valid.
    pub expires_in: u64,
}
