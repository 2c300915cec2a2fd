//! Value types flowing between services.
//!
//! - `pricing`: internal `Price` and the `PriceStream` built from it.
//! - `market`: order books, top of book and `ExecutionOrder`.
//! - `trading`: booked `Trade`s, `Position`s by book and `Pv01` risk.
//! - `inquiry`: customer `Inquiry` records.

pub mod inquiry;
pub mod market;
pub mod pricing;
pub mod trading;

pub use inquiry::Inquiry;
pub use market::{BidOffer, ExecutionOrder, Order, OrderBook, OrderType};
pub use pricing::{Price, PriceStream, PriceStreamOrder};
pub use trading::{Position, Pv01, Trade};
