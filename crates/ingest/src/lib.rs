//! Ingestion for BuddyBot.
//!
//! Reads platform exports, cleans wiki markup, splits documents into chunks,
//! syncs them into the vector index and records every run in the audit log.

pub mod chunker;
pub mod cleaner;
pub mod job;
pub mod scheduler;
pub mod sources;

pub use job::IngestionJob;
pub use scheduler::{IngestionScheduler, SchedulerHandle};
pub use sources::JsonExportSource;
