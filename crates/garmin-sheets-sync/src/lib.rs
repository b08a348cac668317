pub mod client;
pub mod config;
pub mod error;
pub mod gear;
pub mod models;
pub mod sheets;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use error::{Result, SyncError};
