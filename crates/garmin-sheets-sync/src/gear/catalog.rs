//! Gear lookup through the user's gear catalog.
//!
//! The activity-gear endpoint only links ids; names come from the catalog
//! registered to the user's profile, which in turn needs the numeric
//! profile number. Both are resolved once per run.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::client::{ConnectApi, DetailSource, ProfileSource};
use crate::error::{Result, SyncError};
use crate::gear::extract::{
    all_ids, first_text, gear_list, CATALOG_NAME_KEYS, GEAR_SERVICE_LIST_KEYS,
};
use crate::gear::GearStrategy;
use crate::models::GearRecord;

/// Keys that may carry the profile number, in priority order
const PROFILE_NUMBER_KEYS: [&str; 6] = [
    "userProfileNumber",
    "userProfileId",
    "userProfilePK",
    "profileId",
    "id",
    "userId",
];

/// Objects that may wrap the profile keys one level down
const PROFILE_PARENT_KEYS: [&str; 6] = [
    "userProfile",
    "profile",
    "data",
    "userData",
    "socialProfile",
    "settings",
];

fn as_profile_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn profile_number_in(obj: &Map<String, Value>) -> Option<u64> {
    PROFILE_NUMBER_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(as_profile_number))
}

/// Find a profile number at the top level, then one level nested.
pub fn extract_profile_number(payload: &Value) -> Option<u64> {
    let obj = payload.as_object()?;
    profile_number_in(obj).or_else(|| {
        PROFILE_PARENT_KEYS
            .iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_object))
            .find_map(profile_number_in)
    })
}

/// Probe the profile sources in order until one yields a profile number.
pub async fn resolve_profile_number(api: &dyn ConnectApi) -> Result<u64> {
    let mut last_err: Option<SyncError> = None;

    for source in ProfileSource::PROBE_ORDER {
        match api.profile_payload(source).await {
            Ok(payload) => {
                if let Some(number) = extract_profile_number(&payload) {
                    debug!(source = source.name(), number, "found user profile number");
                    return Ok(number);
                }
                let keys: Vec<&str> = payload
                    .as_object()
                    .map(|o| o.keys().map(String::as_str).take(20).collect())
                    .unwrap_or_default();
                debug!(source = source.name(), ?keys, "no profile number in payload");
            }
            Err(e) => {
                debug!(source = source.name(), error = %e, "profile source unavailable");
                last_err = Some(e);
            }
        }
    }

    Err(SyncError::ProfileNotFound(
        last_err.map(|e| e.to_string()).unwrap_or_else(|| "none".to_string()),
    ))
}

/// Gear id to display name for everything registered to the profile
#[derive(Debug, Default, Clone)]
pub struct GearCatalog {
    names: HashMap<String, String>,
}

impl GearCatalog {
    /// Index each item under every id it carries, so lookups work whichever
    /// id flavour the activity-gear endpoint returns.
    pub fn from_payload(payload: &Value) -> Self {
        let mut names = HashMap::new();
        for item in gear_list(payload, &GEAR_SERVICE_LIST_KEYS)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
        {
            let name = first_text(item, &CATALOG_NAME_KEYS).unwrap_or_default();
            for id in all_ids(item) {
                names.insert(id, name.clone());
            }
        }
        Self { names }
    }

    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Join the activity's linked gear against the catalog. Every linked
    /// item is kept; names and ids are comma-separated.
    pub fn resolve_assignment(&self, assigned: &Value) -> GearRecord {
        let mut ids = Vec::new();
        let mut names = Vec::new();

        for item in gear_list(assigned, &GEAR_SERVICE_LIST_KEYS)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
        {
            let item_ids = all_ids(item);
            let Some(primary) = item_ids.first() else {
                continue;
            };
            let name = item_ids
                .iter()
                .find_map(|id| self.name_for(id))
                .filter(|n| !n.is_empty());
            if let Some(name) = name {
                names.push(name.to_string());
            }
            ids.push(primary.clone());
        }

        GearRecord::new(names.join(", "), ids.join(", "))
    }
}

/// Resolves gear by joining activity gear links with the profile catalog.
#[derive(Default)]
pub struct ProfileCatalogStrategy {
    catalog: OnceCell<Option<GearCatalog>>,
}

impl ProfileCatalogStrategy {
    async fn load_catalog(api: &dyn ConnectApi) -> Result<GearCatalog> {
        let number = resolve_profile_number(api).await?;
        let payload = api.gear_catalog(number).await?;
        let catalog = GearCatalog::from_payload(&payload);
        info!(profile = number, entries = catalog.len(), "loaded gear catalog");
        Ok(catalog)
    }
}

#[async_trait]
impl GearStrategy for ProfileCatalogStrategy {
    fn name(&self) -> &'static str {
        "profile-catalog"
    }

    async fn resolve(&self, api: &dyn ConnectApi, activity_id: u64) -> Result<Option<GearRecord>> {
        let catalog = self
            .catalog
            .get_or_init(|| async {
                match Self::load_catalog(api).await {
                    Ok(catalog) => Some(catalog),
                    Err(e) => {
                        warn!(error = %e, "gear catalog unavailable, skipping catalog lookups");
                        None
                    }
                }
            })
            .await;

        let Some(catalog) = catalog else {
            return Ok(None);
        };

        let assigned = api
            .activity_payload(DetailSource::ActivityGear, activity_id)
            .await?;
        let record = catalog.resolve_assignment(&assigned);
        Ok((!record.is_empty()).then_some(record))
    }
}
