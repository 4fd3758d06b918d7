//! Core types and logic for the Jagratha pole monitoring engine.
//!
//! Holds the asset hierarchy, the status evaluator, the alert log and the
//! rollups computed over them. Everything here is synchronous and free of
//! HTTP; `jagratha-engine` adds locking, scheduling and fan-out on top.

pub mod aggregate;
pub mod alert;
pub mod alert_store;
pub mod asset;
pub mod error;
pub mod evaluator;
pub mod feed;
pub mod monitor;
pub mod observation;
pub mod tree;

pub use error::{Error, Result};
