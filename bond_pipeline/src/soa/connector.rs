//! Connector contract: feed parsing on the way in, serialization on the way out.
//!
//! Inbound connectors own a sender into their service's inbox. `subscribe`
//! reads the feed one line at a time, decodes the line, hands the value to the
//! inbox and then calls `settle`, which the composition root uses to run the
//! whole downstream cascade before the next line is read. Lines that fail to
//! decode, and records whose cascade fails with a record error (see
//! [`TradingError::is_record_error`]), are counted and logged, never fatal.
use std::io::BufRead;

use bond_common::{Result, TradingError};
use crossbeam_channel::Sender;
use log::{info, warn};
use serde::Serialize;

use crate::soa::listener::deliver;

/// Counters reported by one `subscribe` pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FeedStats {
    /// Non-blank lines read.
    pub records: usize,
    /// Lines rejected by the decoder or by a downstream service.
    pub skipped: usize,
    /// Values handed to the service.
    pub delivered: usize,
}

/// Boundary adapter of a service.
pub trait Connector<V> {
    /// Serialize `data` to the outbound side.
    fn publish(&mut self, data: &V) -> Result<()>;

    /// Read `source` end to end, ingesting each decoded record before the next
    /// one is read. `settle` runs after every delivered record.
    fn subscribe(
        &mut self,
        source: &mut dyn BufRead,
        settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats>;
}

/// Connector for services with no boundary of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConnector;

impl<V> Connector<V> for NullConnector {
    fn publish(&mut self, _data: &V) -> Result<()> {
        Ok(())
    }

    fn subscribe(
        &mut self,
        _source: &mut dyn BufRead,
        _settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        Ok(FeedStats::default())
    }
}

/// Shared subscribe loop for line-oriented feeds.
///
/// `decode` may return `Ok(None)` for a valid line that does not complete a
/// value yet (e.g. the BID half of a book). If `settle` fails with a record
/// error the record is counted as skipped and `settle` runs again until the
/// remaining cascade drains; any other error aborts the feed.
pub fn drive_feed<M, D>(
    feed: &'static str,
    source: &mut dyn BufRead,
    inbox: &Sender<M>,
    settle: &mut dyn FnMut() -> Result<()>,
    mut decode: D,
) -> Result<FeedStats>
where
    D: FnMut(&str) -> Result<Option<M>>,
{
    let mut stats = FeedStats::default();
    for (index, raw) in source.split(b'\n').enumerate() {
        let raw = raw?;
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                stats.records += 1;
                stats.skipped += 1;
                warn!("{}: skipping line {}: {}", feed, index + 1, e);
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.records += 1;

        match decode(line) {
            Ok(Some(message)) => {
                deliver(inbox, feed, message)?;
                if settle_record(feed, index + 1, settle)? {
                    stats.delivered += 1;
                } else {
                    stats.skipped += 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                stats.skipped += 1;
                let rejected = TradingError::Record {
                    line: index + 1,
                    reason: e.to_string(),
                };
                warn!("{}: {}", feed, rejected);
            }
        }
    }
    info!(
        "{}: {} records, {} delivered, {} skipped",
        feed, stats.records, stats.delivered, stats.skipped
    );
    Ok(stats)
}

/// Run `settle` to completion. Returns false if a record error was raised
/// along the way.
fn settle_record(
    feed: &str,
    line: usize,
    settle: &mut dyn FnMut() -> Result<()>,
) -> Result<bool> {
    let mut clean = true;
    loop {
        match settle() {
            Ok(()) => return Ok(clean),
            Err(e) if e.is_record_error() => {
                clean = false;
                let rejected = TradingError::Record {
                    line,
                    reason: e.to_string(),
                };
                warn!("{}: {}", feed, rejected);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Parse a face amount. Amounts above `i64::MAX` cannot be carried by a
/// signed position and are rejected.
pub fn parse_quantity(text: &str) -> Result<u64> {
    let quantity: u64 = text.parse()?;
    if i64::try_from(quantity).is_err() {
        return Err(TradingError::Overflow(format!(
            "quantity {} exceeds {}",
            quantity,
            i64::MAX
        )));
    }
    Ok(quantity)
}

/// Split a feed line into exactly `expected` comma-separated fields.
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != expected {
        return Err(TradingError::Parse(format!(
            "expected {} fields, found {}",
            expected,
            fields.len()
        )));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    #[test]
    fn skips_bad_lines_and_settles_after_each_delivery() {
        let (tx, rx) = unbounded::<u32>();
        let mut feed = Cursor::new("1\nx\n\n3\n".as_bytes());
        let mut settled = Vec::new();
        let mut settle = || -> Result<()> {
            settled.push(rx.try_iter().collect::<Vec<_>>());
            Ok(())
        };
        let stats = drive_feed("numbers", &mut feed, &tx, &mut settle, |line| {
            Ok(Some(line.parse::<u32>()?))
        })
        .unwrap();

        assert_eq!(
            stats,
            FeedStats {
                records: 3,
                skipped: 1,
                delivered: 2
            }
        );
        assert_eq!(settled, vec![vec![1], vec![3]]);
    }

    #[test]
    fn settle_failure_aborts_the_feed() {
        let (tx, _rx) = unbounded::<u32>();
        let mut feed = Cursor::new("1\n2\n".as_bytes());
        let mut settle = || -> Result<()> { Err(TradingError::Parse("sink down".into())) };
        let result = drive_feed("numbers", &mut feed, &tx, &mut settle, |line| {
            Ok(Some(line.parse::<u32>()?))
        });
        assert!(result.is_err());
    }

    #[test]
    fn record_error_while_settling_skips_the_record() {
        let (tx, rx) = unbounded::<u32>();
        let mut feed = Cursor::new("1\n7\n2\n".as_bytes());
        let mut drained = Vec::new();
        let mut settle = || -> Result<()> {
            for value in rx.try_iter() {
                drained.push(value);
                if value == 7 {
                    return Err(TradingError::Overflow("7 is too large".into()));
                }
            }
            Ok(())
        };
        let stats = drive_feed("numbers", &mut feed, &tx, &mut settle, |line| {
            Ok(Some(line.parse::<u32>()?))
        })
        .unwrap();

        assert_eq!(
            stats,
            FeedStats {
                records: 3,
                skipped: 1,
                delivered: 2
            }
        );
        assert_eq!(drained, vec![1, 7, 2]);
    }

    #[test]
    fn quantities_must_fit_a_signed_position() {
        assert_eq!(parse_quantity("1000000").unwrap(), 1_000_000);
        assert_eq!(parse_quantity("9223372036854775807").unwrap(), i64::MAX as u64);
        assert!(matches!(
            parse_quantity("9223372036854775808"),
            Err(TradingError::Overflow(_))
        ));
        assert!(matches!(
            parse_quantity("18446744073709551615"),
            Err(TradingError::Overflow(_))
        ));
        assert!(matches!(parse_quantity("-5"), Err(TradingError::Parse(_))));
    }

    #[test]
    fn field_count_is_checked() {
        assert_eq!(split_fields("a, b,c", 3).unwrap(), vec!["a", "b", "c"]);
        assert!(split_fields("a,b", 3).is_err());
    }
}
