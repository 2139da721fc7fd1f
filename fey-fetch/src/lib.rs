//! # FEY Fetch
//!
//! Clients for the external data sources behind the dashboard:
//!
//! - [`RpcClient`]: JSON-RPC `eth_call` / `eth_getStorageAt` against Base
//! - [`DuneClient`]: precomputed SQL query results
//! - [`SubgraphClient`]: pool statistics from The Graph
//! - [`ExplorerClient`]: Basescan transaction, internal transaction and log listings
//!
//! Every client applies a request timeout, so a slow source fails instead of
//! stalling the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
mod dune;
mod explorer;
mod http;
mod rpc;
mod subgraph;

pub use dune::{DuneClient, DuneConfig};
pub use explorer::{ExplorerClient, ExplorerConfig, InternalTransaction, LogEntry, Transaction};
pub use rpc::{RpcClient, RpcConfig};
pub use subgraph::{SubgraphClient, SubgraphConfig};
