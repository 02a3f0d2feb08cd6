//! Client for the favorites API: church follows and event likes. Every
//! endpoint requires a Bearer token.

use crate::domain::model::FavoritesSummary;
use crate::utils::error::{FeedError, Result};
use reqwest::{Client, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowStatus {
    is_following: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeStatus {
    is_liked: bool,
}

pub struct FavoritesClient {
    client: Client,
    base_url: String,
    token: String,
}

impl FavoritesClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub async fn follow_church(&self, church_id: i64) -> Result<()> {
        let endpoint = format!("{}/favorites/churches/{}/follow", self.base_url, church_id);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)
    }

    pub async fn unfollow_church(&self, church_id: i64) -> Result<()> {
        let endpoint = format!("{}/favorites/churches/{}/follow", self.base_url, church_id);
        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)
    }

    pub async fn follow_status(&self, church_id: i64) -> Result<bool> {
        let endpoint = format!(
            "{}/favorites/churches/{}/follow/status",
            self.base_url, church_id
        );
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)?;
        let status: FollowStatus = response.json().await?;
        Ok(status.is_following)
    }

    pub async fn like_event(&self, event_id: i64) -> Result<()> {
        let endpoint = format!("{}/favorites/events/{}/like", self.base_url, event_id);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)
    }

    pub async fn unlike_event(&self, event_id: i64) -> Result<()> {
        let endpoint = format!("{}/favorites/events/{}/like", self.base_url, event_id);
        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)
    }

    pub async fn like_status(&self, event_id: i64) -> Result<bool> {
        let endpoint = format!(
            "{}/favorites/events/{}/like/status",
            self.base_url, event_id
        );
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)?;
        let status: LikeStatus = response.json().await?;
        Ok(status.is_liked)
    }

    /// Everything the user follows and likes, with counts, in one call.
    pub async fn fetch_all(&self) -> Result<FavoritesSummary> {
        let endpoint = format!("{}/favorites/all", self.base_url);
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(&endpoint, &response)?;
        let summary = response.json().await?;
        Ok(summary)
    }
}

fn check_status(endpoint: &str, response: &Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(FeedError::ApiStatusError {
            endpoint: endpoint.to_string(),
            status: response.status().as_u16(),
        })
    }
}
