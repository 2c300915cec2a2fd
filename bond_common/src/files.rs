//! File names of the generated feeds and the historical sinks.
//!
//! All names are relative; binaries join them onto their data directory.

/// Two-way price feed: `id,bid,offer`.
pub const PRICES_FILE: &str = "prices.txt";
/// Trade feed: `id,tradeId,price,book,quantity,side`.
pub const TRADES_FILE: &str = "trades.txt";
/// Order book feed: `id,price,quantity,side`.
pub const MARKET_DATA_FILE: &str = "marketdata.txt";
/// Customer inquiry feed: `inquiryId,id,side,quantity,price,status`.
pub const INQUIRIES_FILE: &str = "inquiries.txt";

/// Sink for first-seen positions.
pub const POSITIONS_SINK: &str = "positions.txt";
/// Sink for first-seen PV01 risk.
pub const RISK_SINK: &str = "risk.txt";
/// Sink for first-seen execution orders.
pub const EXECUTIONS_SINK: &str = "executions.txt";
/// Sink for first-seen price streams.
pub const STREAMING_SINK: &str = "streaming.txt";
/// Sink for first-seen inquiries.
pub const INQUIRIES_SINK: &str = "allinquiries.txt";

/// Books that trades are allocated to.
pub const BOOKS: [&str; 3] = ["TRSY1", "TRSY2", "TRSY3"];
