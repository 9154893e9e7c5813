//! `stockroom-stores` — Store entity and its structural rules.

pub mod store;

pub use store::{validate_name, NewStore, Store, StoreUpdate, NAME_MAX_LEN, NAME_MIN_LEN};
