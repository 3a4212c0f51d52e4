use serde::{Deserialize, Serialize};

use crate::domain::{District, RamenType};

/// Body of `POST {base}/recommend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub districts: Vec<District>,
    pub ramen_types: Vec<RamenType>,
    pub min_price: u32,
    pub max_price: u32,
}

/// Success body returned by the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub message: String,
}

impl RecommendResponse {
    /// Structural decode of a response body. A missing or non-string
    /// `message` field is an error; unknown fields are ignored.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
