//! `stockroom-items` — Item entity, structural rules, and read-side
//! capacity reporting.

pub mod item;
pub mod report;

pub use item::{Item, ItemChange, NewItem, LOW_CAPACITY_THRESHOLD};
pub use report::CapacityReport;
