use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Kind of entity a viewer can follow.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetType {
    User,
    Shop,
}

/// Identity of a followable entity.
///
/// Two keys are equal only when both the id and the type match exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowKey {
    target_id: String,
    target_type: TargetType,
}

impl FollowKey {
    pub fn new(target_id: impl Into<String>, target_type: TargetType) -> Result<Self> {
        let target_id = target_id.into();
        if target_id.trim().is_empty() {
            return Err(Error::InvalidTarget("target id must not be empty".to_string()));
        }
        Ok(Self {
            target_id,
            target_type,
        })
    }

    pub fn user(target_id: impl Into<String>) -> Result<Self> {
        Self::new(target_id, TargetType::User)
    }

    pub fn shop(target_id: impl Into<String>) -> Result<Self> {
        Self::new(target_id, TargetType::Shop)
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Key used by the batch-status endpoint: `<targetId>_<targetType>`.
    pub fn wire_key(&self) -> String {
        format!("{}_{}", self.target_id, self.target_type)
    }

    /// Parse a batch-status key. Splits on the last underscore so ids may contain `_`.
    pub fn from_wire_key(wire: &str) -> Result<Self> {
        let (id, kind) = wire
            .rsplit_once('_')
            .ok_or_else(|| Error::InvalidTarget(format!("malformed status key: {wire}")))?;
        let target_type = TargetType::from_str(kind)
            .map_err(|_| Error::InvalidTarget(format!("unknown target type in key: {wire}")))?;
        Self::new(id, target_type)
    }
}

impl fmt::Display for FollowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.target_id)
    }
}

/// `id:type` form used on the command line, e.g. `shop-42:shop`.
impl FromStr for FollowKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, kind) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidTarget(format!("expected <id>:<type>, got {s}")))?;
        let target_type = TargetType::from_str(kind)
            .map_err(|_| Error::InvalidTarget(format!("unknown target type: {kind}")))?;
        Self::new(id, target_type)
    }
}

/// Which side of the follow graph to list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FollowListType {
    Followers,
    Following,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowListQuery {
    pub page: u32,
    pub limit: u32,
    pub entity_type: Option<TargetType>,
}

impl Default for FollowListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            entity_type: None,
        }
    }
}

impl FollowListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn entity_type(mut self, entity_type: TargetType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }
}

/// One row of a followers/following list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowListEntry {
    pub id: String,
    pub target_type: TargetType,
    pub name: String,
    pub slug: Option<String>,
    pub avatar: Option<String>,
    /// Whether the current viewer follows this entry, when the server says so.
    pub is_following: Option<bool>,
}

impl FollowListEntry {
    pub fn key(&self) -> Result<FollowKey> {
        FollowKey::new(self.id.clone(), self.target_type)
    }
}
