//! Google service-account authentication (OAuth 2.0 JWT bearer grant).

use jwt_simple::prelude::{Claims, Duration, RS256KeyPair, RSAKeyPairLike};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceAccountKey;
use crate::error::{Result, SyncError};

/// Read/write access to spreadsheets only
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeClaim {
    pub scope: String,
}

/// Bearer token returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl AccessToken {
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: Client,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { key, http })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Signed RS256 assertion, valid for one hour
    pub fn assertion(&self) -> Result<String> {
        let mut key_pair = RS256KeyPair::from_pem(&self.key.private_key_pem())
            .map_err(|e| SyncError::Jwt(format!("invalid service account key: {}", e)))?;
        if let Some(kid) = self.key.private_key_id.as_deref() {
            key_pair = key_pair.with_key_id(kid);
        }

        let claims = Claims::with_custom_claims(
            ScopeClaim {
                scope: SHEETS_SCOPE.to_string(),
            },
            Duration::from_hours(1),
        )
        .with_issuer(&self.key.client_email)
        .with_audience(&self.key.token_uri);

        key_pair
            .sign(claims)
            .map_err(|e| SyncError::Jwt(e.to_string()))
    }

    /// Exchange the assertion for an access token
    pub async fn access_token(&self) -> Result<AccessToken> {
        let assertion = self.assertion()?;
        debug!(token_uri = %self.key.token_uri, "requesting Google access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::auth(format!(
                "Google token exchange failed ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| {
                SyncError::invalid_response(format!("Failed to parse Google token: {}", e))
            })
    }
}
