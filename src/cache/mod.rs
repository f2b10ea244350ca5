//! Draft cache: short-lived, mutable, handle-keyed storage for content
//! that is mid-workflow, with lazy TTL eviction.
//!
//! The store is owned by the composition root and shared behind `Arc`;
//! handlers only ever interact through handles.

pub mod clock;
mod config;
mod lock;
mod store;

pub use clock::{Clock, SystemClock};
pub use config::DraftCacheConfig;
pub use store::{DraftError, DraftPayload, DraftSnapshot, DraftStore};
