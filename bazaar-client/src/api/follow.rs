use crate::api::client::ApiClient;
use async_trait::async_trait;
use bazaar::domain::{FollowKey, FollowListEntry, FollowListQuery, FollowListType, TargetType};
use bazaar::ports::FollowApi;
use reqwest::Method;
use shared::Result;
use shared_http::api::{
    BatchStatusRequest, BatchStatusResponse, FollowListParams, FollowListResponse,
    FollowStatusResponse, ToggleFollowRequest,
};
use std::collections::HashMap;
use tracing::debug;

/// `FollowApi` over the REST endpoints under `/follow`
#[derive(Clone, Debug)]
pub struct HttpFollowApi {
    client: ApiClient,
}

impl HttpFollowApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FollowApi for HttpFollowApi {
    async fn toggle(&self, key: &FollowKey) -> Result<bool> {
        let response: FollowStatusResponse = self
            .client
            .post(&["follow", "toggle"], &ToggleFollowRequest::from(key))
            .await?;
        Ok(response.is_following)
    }

    async fn status(&self, key: &FollowKey) -> Result<bool> {
        let target_type = key.target_type().to_string();
        let response: FollowStatusResponse = self
            .client
            .get(&["follow", "status", key.target_id(), target_type.as_str()])
            .await?;
        Ok(response.is_following)
    }

    async fn batch_status(&self, keys: &[FollowKey]) -> Result<HashMap<String, bool>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        debug!("Batch follow status for {} targets", keys.len());
        let response: BatchStatusResponse = self
            .client
            .post(&["follow", "batch-status"], &BatchStatusRequest::new(keys))
            .await?;
        Ok(response)
    }

    async fn list(
        &self,
        slug: &str,
        list_type: FollowListType,
        query: &FollowListQuery,
    ) -> Result<Vec<FollowListEntry>> {
        let list_type_segment = list_type.to_string();
        let request = self
            .client
            .request(Method::GET, &["follow", slug, list_type_segment.as_str()])
            .query(&FollowListParams::from(query));
        let response: FollowListResponse = self.client.execute(request).await?;

        let default_type = query.entity_type.unwrap_or(TargetType::User);
        Ok(response
            .list
            .into_iter()
            .map(|item| item.into_entry(default_type))
            .collect())
    }
}
