//! # FEY History
//!
//! Append-only storage for xFEY → FEY conversion snapshots.
//!
//! This crate provides two backends:
//!
//! - **Memory**: In-process storage for development and testing
//! - **libSQL**: The `fey_rates` table on Turso for deployments
//!
//! ## Example
//!
//! ```rust,ignore
//! use fey_history::{MemoryRateHistory, RateHistory};
//!
//! let history = MemoryRateHistory::new();
//! history.record(&snapshot).await?;
//!
//! // Oldest first
//! let points = history.list(100).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod libsql_store;
mod memory;

pub use libsql_store::LibsqlRateHistory;
pub use memory::MemoryRateHistory;

// Re-export the trait from core
pub use fey_core::traits::RateHistory;
