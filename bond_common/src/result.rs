//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `TradingError`, so functions can simply return `Result<T>`.
use crate::error::TradingError;

/// Workspace-wide `Result` alias with `TradingError` as the default error.
pub type Result<T, E = TradingError> = std::result::Result<T, E>;
