use serde::{Deserialize, Serialize};

use super::model::{ClaimStatus, WriteMode};

#[derive(Debug, Deserialize)]
pub struct WriteParams {
    pub mode: Option<WriteMode>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ClaimStatus,
}

/// Body of update and delete responses.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResponse {
    pub rows_affected: u64,
}
