//!
//! Common types and utilities shared by the bond pipeline and the feed generator.
//!
//! This crate aggregates:
//! - `error`: unified error type `TradingError` used across the workspace.
//! - `result`: handy `Result<T, TradingError>` alias.
//! - `securities`: the treasury roster, bond reference data and PV01 table.
//! - `price`: fractional (32nds) price codec.
//! - `wire`: side and status enums spelled as they appear in the files.
//! - `clock`: timestamps for progress output and sink lines.
//! - `files`: feed and sink file names.
//! - `generator`: deterministic synthetic feed generators.
#![warn(missing_docs)]
pub mod clock;
pub mod error;
pub mod files;
pub mod generator;
pub mod price;
pub mod result;
pub mod securities;
pub mod wire;

pub use error::TradingError;
pub use result::Result;
pub use securities::{Bond, Cusip};
