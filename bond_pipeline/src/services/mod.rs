//! Business services, one module per node of the pipeline.
//!
//! Price flow: `pricing` → `algo_streaming` → `streaming`, plus `gui`.
//! Execution flow: `market_data` → `algo_execution` → `execution` →
//! `trade_booking` → `position` → `risk`. Customer flow: `inquiry`.
//! `historical` holds the terminal sinks.

pub mod algo_execution;
pub mod algo_streaming;
pub mod execution;
pub mod gui;
pub mod historical;
pub mod inquiry;
pub mod market_data;
pub mod position;
pub mod pricing;
pub mod risk;
pub mod streaming;
pub mod trade_booking;

pub use algo_execution::AlgoExecutionService;
pub use algo_streaming::AlgoStreamingService;
pub use execution::ExecutionService;
pub use gui::GuiService;
pub use historical::{HistoricalDataService, PersistPolicy, SinkKind};
pub use inquiry::InquiryService;
pub use market_data::MarketDataService;
pub use position::PositionService;
pub use pricing::PricingService;
pub use risk::{BucketedSector, RiskService};
pub use streaming::StreamingService;
pub use trade_booking::TradeBookingService;
