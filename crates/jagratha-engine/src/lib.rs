//! The Jagratha monitoring engine.
//!
//! Wraps the `jagratha-core` tree and alert store in a single-writer
//! [`Engine`], fans new alerts out to subscribers, and drives periodic status
//! ingestion through the [`UpdateScheduler`](scheduler::UpdateScheduler).

mod engine;
mod fanout;

pub mod archive;
pub mod error;
pub mod fleet;
pub mod ingest;
pub mod scheduler;

pub use engine::Engine;
pub use error::{Error, Result};
