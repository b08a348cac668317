pub mod activity;
pub mod gear;
pub mod row;

pub use activity::{ActivitySummary, ActivityType};
pub use gear::GearRecord;
pub use row::{OutputRow, HEADER};
