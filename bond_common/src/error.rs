//! Error types shared by the pipeline and the feed generator.
//!
//! The `TradingError` enum unifies the failure cases of the workspace: I/O on
//! feeds and sinks, text parsing (prices, dates, records), lookups against the
//! security master and service stores, and channel communication between
//! services.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::wire::InquiryState;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum TradingError {
    /// I/O error originating from the standard library (feed files, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic parse failure (dates, numbers) with a human-readable message.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Text that does not follow the `<int>-<32nds><eighth>` price grammar.
    #[error("Invalid fractional price '{0}'")]
    PriceFormat(String),

    /// A feed line that could not be decoded into a value.
    #[error("Malformed record at line {line}: {reason}")]
    Record {
        /// One-based line number within the feed.
        line: usize,
        /// Why the record was rejected.
        reason: String,
    },

    /// A quantity or running position that does not fit a signed 64-bit face amount.
    #[error("Quantity overflow: {0}")]
    Overflow(String),

    /// A quote was requested for an inquiry that is no longer RECEIVED.
    #[error("Inquiry {inquiry_id} is {state} and cannot be quoted")]
    NotQuotable {
        /// Inquiry identifier.
        inquiry_id: String,
        /// State the stored inquiry is in.
        state: InquiryState,
    },

    /// Identifier that is not part of the security master.
    #[error("Unknown security: {0}")]
    UnknownSecurity(String),

    /// Key lookup against a service store failed.
    #[error("Key not found in {service}: {key}")]
    NotFound {
        /// Name of the service that was queried.
        service: &'static str,
        /// The missing key.
        key: String,
    },

    /// Opening or writing a historical sink failed; fatal for the run.
    #[error("Sink {path} failed: {source}")]
    Sink {
        /// Path of the sink file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// Crossbeam/channel send failed (receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),
}

impl TradingError {
    /// True for failures caused by the content of one record. A feed drops the
    /// offending record and continues; every other error ends the run.
    pub fn is_record_error(&self) -> bool {
        matches!(self, TradingError::Overflow(_))
    }
}

impl From<chrono::ParseError> for TradingError {
    fn from(err: chrono::ParseError) -> Self {
        TradingError::Parse(err.to_string())
    }
}

impl From<std::num::ParseIntError> for TradingError {
    fn from(err: std::num::ParseIntError) -> Self {
        TradingError::Parse(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for TradingError {
    fn from(err: std::num::ParseFloatError) -> Self {
        TradingError::Parse(err.to_string())
    }
}

impl From<strum::ParseError> for TradingError {
    fn from(err: strum::ParseError) -> Self {
        TradingError::Parse(err.to_string())
    }
}
