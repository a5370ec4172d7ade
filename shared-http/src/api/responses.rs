use bazaar::domain::{FollowListEntry, TargetType};
use serde::Deserialize;
use std::collections::HashMap;

/// Envelope every endpoint answers with: `{success, data, message}`
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Payload of a successful response, or the server's message.
    pub fn into_result(self) -> Result<T, ErrorResponse> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ErrorResponse::new("Response carried no data")),
            (false, _) => Err(ErrorResponse::new(
                self.message.unwrap_or_else(|| "Request failed".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

/// `"<targetId>_<targetType>" -> isFollowing`
pub type BatchStatusResponse = HashMap<String, bool>;

#[derive(Debug, Deserialize)]
pub struct FollowListResponse {
    #[serde(default)]
    pub list: Vec<FollowListItem>,
}

/// Row of a follow list as sent by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawFollowListItem")]
pub struct FollowListItem {
    pub id: String,
    pub target_type: Option<TargetType>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub avatar: Option<String>,
    pub is_following: Option<bool>,
}

// Documents may carry `_id`, an `id` virtual, or both
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFollowListItem {
    #[serde(default, rename = "_id")]
    document_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "type", alias = "entityType")]
    target_type: Option<TargetType>,
    #[serde(default, alias = "username", alias = "shopName")]
    name: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default, alias = "logo")]
    avatar: Option<String>,
    #[serde(default)]
    is_following: Option<bool>,
}

impl TryFrom<RawFollowListItem> for FollowListItem {
    type Error = String;

    fn try_from(raw: RawFollowListItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(raw.document_id, raw.id)?,
            target_type: raw.target_type,
            name: raw.name,
            slug: raw.slug,
            avatar: raw.avatar,
            is_following: raw.is_following,
        })
    }
}

fn document_id(document_id: Option<String>, id: Option<String>) -> Result<String, String> {
    document_id
        .or(id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| "missing field `_id`".to_string())
}

impl FollowListItem {
    /// Convert, assuming `default_type` when the row does not say.
    pub fn into_entry(self, default_type: TargetType) -> FollowListEntry {
        FollowListEntry {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            target_type: self.target_type.unwrap_or(default_type),
            slug: self.slug,
            avatar: self.avatar,
            is_following: self.is_following,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawLoginResponse")]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RawLoginResponse {
    #[serde(default, rename = "_id")]
    document_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "name")]
    username: String,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<RawLoginResponse> for LoginResponse {
    type Error = String;

    fn try_from(raw: RawLoginResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(raw.document_id, raw.id)?,
            username: raw.username,
            email: raw.email,
        })
    }
}

// Error response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "error")]
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
