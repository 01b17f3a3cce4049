pub mod history;
pub mod reports;
pub mod tables;

pub use history::{AuditSummary, TransitionRecord, audit_snapshots};
pub use tables::{MetricTable, leader_table, snapshot_table};
