use chrono::Utc;
use serde::Deserialize;

/// OAuth1 token obtained from the SSO ticket. Only lives for the duration
/// of a run; it is exchanged for an OAuth2 bearer immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth1Token {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    pub mfa_token: Option<String>,
    pub domain: String,
}

impl OAuth1Token {
    pub fn new(oauth_token: String, oauth_token_secret: String, domain: &str) -> Self {
        Self {
            oauth_token,
            oauth_token_secret,
            mfa_token: None,
            domain: domain.to_string(),
        }
    }

    pub fn with_mfa(mut self, mfa_token: Option<String>) -> Self {
        self.mfa_token = mfa_token;
        self
    }
}

/// OAuth2 Bearer token for Connect API requests.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OAuth2Token {
    #[serde(default)]
    pub scope: String,
    pub token_type: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: i64,
}

impl OAuth2Token {
    /// Stamp the absolute expiry from `expires_in`.
    pub fn issued_now(mut self) -> Self {
        self.expires_at = Utc::now().timestamp() + self.expires_in;
        self
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
