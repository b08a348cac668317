//! Sync pipeline: fetch recent activities, keep the runs, append the ones
//! the sheet has not seen yet.
//!
//! Fetch and store-read failures end the run. Anything that goes wrong
//! with a single activity is reported and counted, then skipped.

pub mod filter;
pub mod ledger;
pub mod report;
pub mod units;

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::client::ConnectApi;
use crate::config::DEFAULT_ACTIVITY_LIMIT;
use crate::error::{Result, SyncError};
use crate::gear::GearResolver;
use crate::models::{ActivitySummary, OutputRow};
use crate::sheets::RowStore;

pub use ledger::Ledger;
pub use report::{
    ConsoleReporter, MemoryReporter, Severity, SyncEvent, SyncReporter, SyncSummary,
};

pub struct SyncPipeline {
    limit: u32,
    resolver: GearResolver,
    reporter: Arc<dyn SyncReporter>,
}

impl SyncPipeline {
    pub fn new(reporter: Arc<dyn SyncReporter>) -> Self {
        Self {
            limit: DEFAULT_ACTIVITY_LIMIT,
            resolver: GearResolver::default(),
            reporter,
        }
    }

    /// How many of the most recent activities to consider
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_resolver(mut self, resolver: GearResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub async fn run(&self, api: &dyn ConnectApi, store: &dyn RowStore) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();

        let fetched = api.recent_activities(0, self.limit).await?;
        summary.fetched = fetched.len();
        self.reporter.report(SyncEvent::Fetched {
            total: summary.fetched,
        });

        let running: Vec<Value> = fetched.into_iter().filter(filter::is_running).collect();
        summary.running = running.len();
        self.reporter.report(SyncEvent::RunningFiltered {
            running: summary.running,
        });

        if running.is_empty() {
            self.reporter.report(SyncEvent::NoRunningActivities);
            return Ok(summary);
        }

        let mut ledger = Ledger::load(store).await?;
        summary.existing = ledger.len();
        self.reporter.report(SyncEvent::LedgerLoaded {
            existing: summary.existing,
        });

        for raw in running {
            let activity_id = raw_activity_id(&raw);
            match self.sync_one(api, &mut ledger, raw).await {
                Ok(Outcome::Added) => summary.added += 1,
                Ok(Outcome::AlreadyRecorded) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    self.reporter.report(SyncEvent::ActivityFailed {
                        activity_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.reporter.report(SyncEvent::Finished(summary));
        Ok(summary)
    }

    async fn sync_one(
        &self,
        api: &dyn ConnectApi,
        ledger: &mut Ledger<'_>,
        raw: Value,
    ) -> Result<Outcome> {
        let activity: ActivitySummary = serde_json::from_value(raw)
            .map_err(|e| SyncError::invalid_response(format!("malformed activity: {}", e)))?;
        let activity_id = activity.id_string();

        if !ledger.is_new(&activity_id) {
            self.reporter.report(SyncEvent::AlreadyRecorded { activity_id });
            return Ok(Outcome::AlreadyRecorded);
        }

        let gear = self.resolver.resolve(api, activity.activity_id).await;
        self.reporter.report(SyncEvent::GearResolved {
            activity_id: activity_id.clone(),
            name: gear.name.clone(),
            id: gear.id.clone(),
        });

        let row = OutputRow::from_activity(&activity, gear);
        ledger.record(&activity_id, &row).await?;
        debug!(activity_id = %activity_id, "row appended");

        self.reporter.report(SyncEvent::Added {
            activity_id,
            date: row.date,
            name: row.activity_name,
            distance_km: row.distance_km,
        });
        Ok(Outcome::Added)
    }
}

enum Outcome {
    Added,
    AlreadyRecorded,
}

/// Best-effort id for error reports about entries that fail to parse
fn raw_activity_id(raw: &Value) -> Option<String> {
    match raw.get("activityId")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
