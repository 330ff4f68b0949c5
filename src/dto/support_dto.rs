use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PickupRequest;
use crate::utils::validation::{validate_not_empty, validate_phone};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupportMessageRequest {
    #[validate(custom = "validate_phone")]
    pub user_phone: String,
    #[validate(custom = "validate_not_empty", length(max = 200))]
    pub subject: String,
    #[validate(custom = "validate_not_empty", length(max = 5000))]
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UserRequestStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

#[derive(Debug, Serialize)]
pub struct UserRequestsResponse {
    pub requests: Vec<PickupRequest>,
    pub stats: UserRequestStats,
}
