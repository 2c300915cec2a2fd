//! Bond trading pipeline.
//!
//! Synthetic feeds flow through a graph of keyed services built on a small
//! service-oriented framework:
//! - `soa`: the `Service`, `ServiceListener` and `Connector` contracts, the
//!   generic keyed store and the inboxes that carry messages between services.
//! - `model`: value types stored and exchanged by the services.
//! - `services`: the business services and the historical sinks.
//! - `pipeline`: the composition root that wires and drives everything.
#![warn(missing_docs)]
pub mod model;
pub mod pipeline;
pub mod services;
pub mod soa;

pub use pipeline::{Feed, RunSummary, SystemConfig, TradingSystem};
