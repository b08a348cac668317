//! Gear (shoe) resolution for activities.
//!
//! A `GearResolver` owns an ordered list of strategies and returns the
//! first non-empty record. Strategy failures never reach the caller; an
//! activity whose gear cannot be determined gets an empty record.

pub mod catalog;
pub mod detail;
pub mod extract;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::ConnectApi;
use crate::error::Result;
use crate::models::GearRecord;

pub use catalog::{GearCatalog, ProfileCatalogStrategy};
pub use detail::DetailPayloadStrategy;

/// One way of finding the shoe worn on an activity.
#[async_trait]
pub trait GearStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means this strategy found nothing; errors are treated
    /// the same way by the resolver.
    async fn resolve(&self, api: &dyn ConnectApi, activity_id: u64) -> Result<Option<GearRecord>>;
}

pub struct GearResolver {
    strategies: Vec<Box<dyn GearStrategy>>,
}

impl Default for GearResolver {
    /// Detail payload first, then the profile catalog join
    fn default() -> Self {
        Self::new(vec![
            Box::new(DetailPayloadStrategy::default()),
            Box::new(ProfileCatalogStrategy::default()),
        ])
    }
}

impl GearResolver {
    pub fn new(strategies: Vec<Box<dyn GearStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, api: &dyn ConnectApi, activity_id: u64) -> GearRecord {
        for strategy in &self.strategies {
            match strategy.resolve(api, activity_id).await {
                Ok(Some(record)) if !record.is_empty() => {
                    debug!(
                        activity_id,
                        strategy = strategy.name(),
                        name = %record.name,
                        id = %record.id,
                        "resolved gear"
                    );
                    return record;
                }
                Ok(_) => {
                    debug!(activity_id, strategy = strategy.name(), "no gear found");
                }
                Err(e) if e.is_unavailable() => {
                    debug!(
                        activity_id,
                        strategy = strategy.name(),
                        error = %e,
                        "gear strategy unavailable"
                    );
                }
                Err(e) => {
                    warn!(
                        activity_id,
                        strategy = strategy.name(),
                        error = %e,
                        "gear strategy failed"
                    );
                }
            }
        }
        GearRecord::default()
    }
}
