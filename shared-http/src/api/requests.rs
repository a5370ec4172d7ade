use bazaar::domain::{FollowKey, FollowListQuery, TargetType};
use serde::Serialize;

/// One target in a follow request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowTargetRequest {
    pub target_id: String,
    pub target_type: TargetType,
}

impl From<&FollowKey> for FollowTargetRequest {
    fn from(key: &FollowKey) -> Self {
        Self {
            target_id: key.target_id().to_string(),
            target_type: key.target_type(),
        }
    }
}

/// Request body for `POST /follow/toggle`
pub type ToggleFollowRequest = FollowTargetRequest;

/// Request body for `POST /follow/batch-status`
#[derive(Debug, Clone, Serialize)]
pub struct BatchStatusRequest {
    pub targets: Vec<FollowTargetRequest>,
}

impl BatchStatusRequest {
    pub fn new(keys: &[FollowKey]) -> Self {
        Self {
            targets: keys.iter().map(FollowTargetRequest::from).collect(),
        }
    }
}

/// Query string for `GET /follow/{slug}/{listType}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListParams {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<TargetType>,
}

impl From<&FollowListQuery> for FollowListParams {
    fn from(query: &FollowListQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            entity_type: query.entity_type,
        }
    }
}

/// Request body for login endpoint
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
