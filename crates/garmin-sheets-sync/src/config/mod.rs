mod credentials;

pub use credentials::ServiceAccountKey;

use crate::error::{Result, SyncError};
use secrecy::SecretString;
use std::path::Path;

/// Default Garmin domain
pub const DEFAULT_DOMAIN: &str = "garmin.com";

/// Number of most recent activities pulled per run
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 20;

/// Local fallback for the Google service-account key
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

pub const ENV_EMAIL: &str = "GARMIN_EMAIL";
pub const ENV_PASSWORD: &str = "GARMIN_PASSWORD";
pub const ENV_GOOGLE_CREDENTIALS: &str = "GOOGLE_CREDENTIALS";
pub const ENV_SHEET_ID: &str = "SHEET_ID";
pub const ENV_DOMAIN: &str = "GARMIN_DOMAIN";

/// Everything a sync run needs before touching the network.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub garmin_email: String,
    pub garmin_password: SecretString,
    pub google_credentials: SecretString,
    pub sheet_id: String,
    pub sheet_tab: Option<String>,
    pub domain: String,
    pub activity_limit: u32,
}

/// Which required settings were found. Used to print the checklist when
/// the run has to stop early.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Presence {
    pub garmin_email: bool,
    pub garmin_password: bool,
    pub google_credentials: bool,
    pub sheet_id: bool,
}

impl Presence {
    pub fn is_complete(&self) -> bool {
        self.garmin_email && self.garmin_password && self.google_credentials && self.sheet_id
    }

    /// `(variable, present)` pairs in display order
    pub fn checklist(&self) -> [(&'static str, bool); 4] {
        [
            (ENV_EMAIL, self.garmin_email),
            (ENV_PASSWORD, self.garmin_password),
            (ENV_GOOGLE_CREDENTIALS, self.google_credentials),
            (ENV_SHEET_ID, self.sheet_id),
        ]
    }
}

/// Outcome of reading configuration: either a usable config or the list
/// of what was missing.
#[derive(Debug)]
pub enum Loaded {
    Ready(SyncConfig),
    Missing(Presence),
}

impl SyncConfig {
    /// Read configuration from the process environment. The credentials
    /// blob falls back to `credentials_file` when the variable is unset.
    pub fn from_env(credentials_file: &Path) -> Result<Loaded> {
        Self::from_env_with(|k| std::env::var(k).ok(), credentials_file)
    }

    /// Testable variant that reads values through `get` instead of the
    /// global environment.
    pub fn from_env_with<F>(mut get: F, credentials_file: &Path) -> Result<Loaded>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut non_empty = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let email = non_empty(ENV_EMAIL);
        let password = non_empty(ENV_PASSWORD);
        let sheet_id = non_empty(ENV_SHEET_ID);
        let domain = non_empty(ENV_DOMAIN);

        let google_credentials = match non_empty(ENV_GOOGLE_CREDENTIALS) {
            Some(blob) => Some(blob),
            None if credentials_file.exists() => {
                tracing::info!(
                    "Loading Google credentials from {}",
                    credentials_file.display()
                );
                let blob = std::fs::read_to_string(credentials_file)?;
                Some(blob).filter(|b| !b.trim().is_empty())
            }
            None => None,
        };

        let presence = Presence {
            garmin_email: email.is_some(),
            garmin_password: password.is_some(),
            google_credentials: google_credentials.is_some(),
            sheet_id: sheet_id.is_some(),
        };

        match (email, password, google_credentials, sheet_id) {
            (Some(email), Some(password), Some(creds), Some(sheet_id)) => {
                Ok(Loaded::Ready(SyncConfig {
                    garmin_email: email,
                    garmin_password: SecretString::new(password.into()),
                    google_credentials: SecretString::new(creds.into()),
                    sheet_id,
                    sheet_tab: None,
                    domain: domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
                    activity_limit: DEFAULT_ACTIVITY_LIMIT,
                }))
            }
            _ => Ok(Loaded::Missing(presence)),
        }
    }

    pub fn with_sheet_tab(mut self, tab: Option<String>) -> Self {
        self.sheet_tab = tab.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_activity_limit(mut self, limit: u32) -> Result<Self> {
        if limit == 0 {
            return Err(SyncError::config("activity limit must be at least 1"));
        }
        self.activity_limit = limit;
        Ok(self)
    }
}
