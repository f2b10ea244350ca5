//! Content-generation pipeline service.
//!
//! Takes an uploaded document, extracts its text, derives a week/day
//! content calendar, produces platform-tailored posts, and persists the
//! results to Postgres and a JSON output file. In-flight edits live in the
//! TTL-bounded draft cache under `cache`.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
