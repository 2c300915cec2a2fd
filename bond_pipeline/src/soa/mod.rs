//! Service-oriented plumbing shared by every business service.
//!
//! - `service`: the keyed `Service` contract and the generic `ServiceStore`.
//! - `listener`: the `ServiceListener` contract and the `Relay` adapter.
//! - `connector`: the `Connector` contract and the shared feed loop.
//! - `inbox`: per-service inbound channels and the `Pump` that drains them.

pub mod connector;
pub mod inbox;
pub mod listener;
pub mod service;

pub use connector::{Connector, FeedStats, NullConnector};
pub use inbox::{Inbox, Node, Pump};
pub use listener::{Relay, ServiceListener};
pub use service::{Keyed, Persistable, Service, ServiceStore};
