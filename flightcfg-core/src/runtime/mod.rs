//! Runtime selection state kept alongside the record

pub mod latch;
pub mod selector;

pub use latch::{FeatureLatch, ONESHOT_FEATURE_CHANGED_DELAY_MS};
pub use selector::ProfileSelector;
