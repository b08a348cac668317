//! Garmin Connect API client for authenticated requests
//!
//! `GarminClient` speaks HTTP; `ConnectApi` is the narrow set of typed calls
//! the sync pipeline and gear strategies depend on, so they can run against
//! fakes in tests.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::client::tokens::OAuth2Token;
use crate::error::{Result, SyncError};

/// User agent for Connect API requests
const API_USER_AGENT: &str = "GCM-iOS-5.7.2.1";

/// Upstream payloads that may carry gear for a single activity, in the
/// order they are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailSource {
    /// Activity detail document
    Activity,
    /// Chart/detail metrics document
    ActivityDetails,
    /// Gear linked to the activity
    ActivityGear,
}

impl DetailSource {
    pub const PROBE_ORDER: [DetailSource; 3] = [
        DetailSource::Activity,
        DetailSource::ActivityDetails,
        DetailSource::ActivityGear,
    ];

    pub fn path(&self, activity_id: u64) -> String {
        match self {
            Self::Activity => format!("/activity-service/activity/{}", activity_id),
            Self::ActivityDetails => format!("/activity-service/activity/{}/details", activity_id),
            Self::ActivityGear => {
                format!("/gear-service/gear/filterGear?activityId={}", activity_id)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::ActivityDetails => "activity-details",
            Self::ActivityGear => "activity-gear",
        }
    }
}

/// Upstream payloads that may carry the numeric user profile number, in
/// the order they are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSource {
    UserProfile,
    UserSettings,
    SocialProfile,
    PersonalInformation,
}

impl ProfileSource {
    pub const PROBE_ORDER: [ProfileSource; 4] = [
        ProfileSource::UserProfile,
        ProfileSource::UserSettings,
        ProfileSource::SocialProfile,
        ProfileSource::PersonalInformation,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::UserProfile => "/userprofile-service/userprofile/settings",
            Self::UserSettings => "/userprofile-service/userprofile/user-settings",
            Self::SocialProfile => "/userprofile-service/socialProfile",
            Self::PersonalInformation => "/userprofile-service/userprofile/personal-information",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UserProfile => "user-profile",
            Self::UserSettings => "user-settings",
            Self::SocialProfile => "social-profile",
            Self::PersonalInformation => "personal-information",
        }
    }
}

/// Typed Connect calls used by the sync job
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Most recent activities, newest first, as raw JSON objects
    async fn recent_activities(&self, start: u32, limit: u32) -> Result<Vec<Value>>;

    async fn activity_payload(&self, source: DetailSource, activity_id: u64) -> Result<Value>;

    async fn profile_payload(&self, source: ProfileSource) -> Result<Value>;

    /// Every gear item registered to the profile
    async fn gear_catalog(&self, user_profile_number: u64) -> Result<Value>;
}

/// Garmin Connect API client
pub struct GarminClient {
    client: Client,
    base_url: String,
    token: OAuth2Token,
}

impl GarminClient {
    /// Create a new API client for the given domain
    pub fn new(domain: &str, token: OAuth2Token) -> Result<Self> {
        Self::new_with_base_url(&format!("https://connectapi.{}", domain), token)
    }

    /// Create a new API client with a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str, token: OAuth2Token) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make an authenticated GET request and return the response
    pub async fn get(&self, path: &str) -> Result<Response> {
        let response = self
            .client
            .get(self.build_url(path))
            .header(USER_AGENT, API_USER_AGENT)
            .header(AUTHORIZATION, self.token.authorization_header())
            .send()
            .await?;

        handle_response_status(path, response).await
    }

    /// Make an authenticated GET request and deserialize the JSON body.
    /// An empty body (204) deserializes as JSON `null`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?.text().await?;
        let parsed = if body.trim().is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_str(&body)
        };
        parsed.map_err(|e| {
            SyncError::invalid_response(format!("Failed to parse JSON from {}: {}", path, e))
        })
    }
}

#[async_trait]
impl ConnectApi for GarminClient {
    async fn recent_activities(&self, start: u32, limit: u32) -> Result<Vec<Value>> {
        let path = format!(
            "/activitylist-service/activities/search/activities?start={}&limit={}",
            start, limit
        );
        self.get_json(&path).await
    }

    async fn activity_payload(&self, source: DetailSource, activity_id: u64) -> Result<Value> {
        self.get_json(&source.path(activity_id)).await
    }

    async fn profile_payload(&self, source: ProfileSource) -> Result<Value> {
        self.get_json(source.path()).await
    }

    async fn gear_catalog(&self, user_profile_number: u64) -> Result<Value> {
        let path = format!("/gear-service/gear/filterGear?userProfilePk={}", user_profile_number);
        self.get_json(&path).await
    }
}

/// Convert response status codes to errors
async fn handle_response_status(path: &str, response: Response) -> Result<Response> {
    let status = response.status();

    match status {
        s if s.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(SyncError::NotAuthenticated),
        StatusCode::TOO_MANY_REQUESTS => Err(SyncError::RateLimited),
        StatusCode::NOT_FOUND => Err(SyncError::NotFound(path.to_string())),
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> OAuth2Token {
        OAuth2Token {
            scope: String::new(),
            token_type: "Bearer".to_string(),
            access_token: "t".to_string(),
            refresh_token: String::new(),
            expires_in: 3600,
            expires_at: 0,
        }
    }

    #[test]
    fn test_build_url() {
        let client = GarminClient::new("garmin.com", token()).unwrap();
        assert_eq!(
            client.build_url("/activity-service/activity/123"),
            "https://connectapi.garmin.com/activity-service/activity/123"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = GarminClient::new_with_base_url("http://localhost:1234/", token()).unwrap();
        assert_eq!(client.build_url("/x"), "http://localhost:1234/x");
    }

    #[test]
    fn test_detail_source_paths() {
        assert_eq!(
            DetailSource::ActivityGear.path(42),
            "/gear-service/gear/filterGear?activityId=42"
        );
        assert_eq!(DetailSource::PROBE_ORDER[0], DetailSource::Activity);
    }

    #[test]
    fn test_profile_source_order() {
        let names: Vec<_> = ProfileSource::PROBE_ORDER.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["user-profile", "user-settings", "social-profile", "personal-information"]
        );
    }
}
