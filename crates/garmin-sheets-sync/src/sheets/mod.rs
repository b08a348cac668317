//! Destination store: a Google Sheets worksheet holding one row per run.

pub mod auth;
pub mod client;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use auth::ServiceAccountAuth;
pub use client::SheetsClient;

/// Append-only tabular sink
#[async_trait]
pub trait RowStore: Send + Sync {
    /// First-column text of every row, header included. Blank cells come
    /// back as empty strings.
    async fn first_column(&self) -> Result<Vec<String>>;

    /// Append one row after the last non-empty row. One call, one write.
    async fn append_row(&self, cells: &[Value]) -> Result<()>;
}
