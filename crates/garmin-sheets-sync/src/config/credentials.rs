use crate::error::{Result, SyncError};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google service-account key, as downloaded from the cloud console.
/// Only the fields needed for the JWT bearer flow are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(deserialize_with = "deserialize_secret")]
    pub private_key: SecretString,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

impl ServiceAccountKey {
    /// Parse the JSON credential blob.
    pub fn from_json(blob: &SecretString) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(blob.expose_secret())
            .map_err(|e| SyncError::config(format!("Invalid Google credentials JSON: {}", e)))?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(SyncError::config(format!(
                    "Google credentials must be a service account key, got '{}'",
                    kind
                )));
            }
        }
        if !key.private_key.expose_secret().contains("PRIVATE KEY") {
            return Err(SyncError::config(
                "Google credentials private_key is not a PEM block",
            ));
        }

        Ok(key)
    }

    /// Private key PEM with escaped newlines restored. Keys pasted into CI
    /// secrets often arrive with literal `\n` sequences.
    pub fn private_key_pem(&self) -> String {
        self.private_key.expose_secret().replace("\\n", "\n")
    }
}
