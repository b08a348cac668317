use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::{ConnectApi, DetailSource};
use crate::error::Result;
use crate::gear::extract::shoe_from_detail;
use crate::gear::GearStrategy;
use crate::models::GearRecord;

/// Reads gear straight out of the first activity payload Connect serves.
pub struct DetailPayloadStrategy {
    sources: Vec<DetailSource>,
}

impl Default for DetailPayloadStrategy {
    fn default() -> Self {
        Self::new(DetailSource::PROBE_ORDER.to_vec())
    }
}

impl DetailPayloadStrategy {
    pub fn new(sources: Vec<DetailSource>) -> Self {
        Self { sources }
    }

    /// First payload that loads successfully, or `{}` when every source
    /// fails.
    pub async fn fetch_payload(&self, api: &dyn ConnectApi, activity_id: u64) -> Value {
        let mut last_err = None;

        for source in &self.sources {
            match api.activity_payload(*source, activity_id).await {
                Ok(payload) => {
                    debug!(activity_id, source = source.name(), "loaded detail payload");
                    return payload;
                }
                Err(e) => {
                    debug!(
                        activity_id,
                        source = source.name(),
                        error = %e,
                        "detail source unavailable"
                    );
                    last_err = Some(e);
                }
            }
        }

        if let Some(e) = last_err {
            debug!(activity_id, error = %e, "no detail source answered");
        }
        Value::Object(Default::default())
    }
}

#[async_trait]
impl GearStrategy for DetailPayloadStrategy {
    fn name(&self) -> &'static str {
        "detail-payload"
    }

    async fn resolve(&self, api: &dyn ConnectApi, activity_id: u64) -> Result<Option<GearRecord>> {
        let payload = self.fetch_payload(api, activity_id).await;
        let record = shoe_from_detail(&payload);
        Ok((!record.is_empty()).then_some(record))
    }
}
