//! Known-id ledger over the destination store.
//!
//! Ids are read once at run start and extended in memory after every
//! successful append, so an id is never written twice within or across runs.

use std::collections::HashSet;
use tracing::info;

use crate::error::{Result, SyncError};
use crate::models::OutputRow;
use crate::sheets::RowStore;

pub struct Ledger<'a> {
    store: &'a dyn RowStore,
    known: HashSet<String>,
}

impl<'a> Ledger<'a> {
    /// Read column A. The first row is the header; an empty store gets one.
    pub async fn load(store: &'a dyn RowStore) -> Result<Ledger<'a>> {
        let column = store.first_column().await?;

        if column.is_empty() {
            store.append_row(&OutputRow::header_cells()).await?;
            info!("wrote header row to empty sheet");
        }

        let known = column
            .into_iter()
            .skip(1)
            .filter(|id| !id.is_empty())
            .collect();

        Ok(Self { store, known })
    }

    pub fn is_new(&self, activity_id: &str) -> bool {
        !self.known.contains(activity_id)
    }

    /// Append the row, then remember its id. A failed append leaves the
    /// ledger unchanged.
    pub async fn record(&mut self, activity_id: &str, row: &OutputRow) -> Result<()> {
        if !self.is_new(activity_id) {
            return Err(SyncError::Duplicate(activity_id.to_string()));
        }
        self.store.append_row(&row.to_cells()).await?;
        self.known.insert(activity_id.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
