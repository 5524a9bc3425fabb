//! Campaign domain: entities, persistence, resolution, and retrieval.

pub mod analysis;
pub mod chunks;
pub mod ingest;
pub mod merge;
pub mod resolve;
pub mod search;
pub mod store;
pub mod types;
