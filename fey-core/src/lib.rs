//! # FEY Core
//!
//! Core types, errors, and traits for the FEY dashboard backend.
//!
//! This crate provides the foundational building blocks used by all other FEY crates:
//!
//! - **Types**: Cache entries, rate snapshots, probe results and dashboard records
//! - **Errors**: A single error hierarchy shared by fetchers, stores and the API
//! - **Constants**: Contract addresses, cache keys, TTLs and probe thresholds
//! - **Traits**: Storage and clock interfaces so backends can be swapped in tests
//!
//! ## Example
//!
//! ```rust
//! use fey_core::{RateSnapshot, SystemClock, Clock};
//!
//! let snapshot = RateSnapshot::from_amounts(1_000_000, 1_050_000, SystemClock.now()).unwrap();
//! assert_eq!(snapshot.total_gain(), 50_000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{ManualClock, SystemClock};
pub use constants::*;
pub use error::{FeyError, Result};
pub use traits::*;
pub use types::*;
