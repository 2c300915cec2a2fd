//! Synthetic feed generation.
//!
//! Four generators produce the input files of the pipeline:
//!
//! - `write_prices`: two-way prices oscillating between 99 and 101.
//! - `write_trades`: a handful of trades per security across three books.
//! - `write_market_data`: one BID and one OFFER level per tick, same oscillation as prices.
//! - `write_inquiries`: customer inquiries in state RECEIVED.
//!
//! Everything is deterministic except trade and inquiry identifiers, which are
//! drawn from the caller's random number generator. Counters that span several
//! securities are explicit values threaded through the loops (`Cycle`), and the
//! mid-price walk is an `Oscillator` reset per security.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::files::{BOOKS, INQUIRIES_FILE, MARKET_DATA_FILE, PRICES_FILE, TRADES_FILE};
use crate::price::to_fractional;
use crate::result::Result;
use crate::securities::Cusip;
use crate::wire::{InquiryState, PricingSide, Side};

const TICK: f64 = 1.0 / 256.0;
const WIDE_HALF_SPREAD: f64 = 1.0 / 128.0;
const FLOOR_MID: f64 = 99.0;
const CEILING_MID: f64 = 101.0;
const TOLERANCE: f64 = 1e-6;
const LOT: u64 = 1_000_000;
const ID_LENGTH: usize = 12;
const ID_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Rows generated per security for each feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSizes {
    /// Price rows per security.
    pub prices: usize,
    /// Trades per security.
    pub trades: usize,
    /// Market data ticks per security (two rows each).
    pub ticks: usize,
    /// Inquiries per security.
    pub inquiries: usize,
}

impl Default for FeedSizes {
    fn default() -> Self {
        FeedSizes {
            prices: 1000,
            trades: 10,
            ticks: 10000,
            inquiries: 10,
        }
    }
}

/// Number of lines written to each feed file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedCounts {
    /// Lines in `prices.txt`.
    pub prices: usize,
    /// Lines in `trades.txt`.
    pub trades: usize,
    /// Lines in `marketdata.txt`.
    pub market_data: usize,
    /// Lines in `inquiries.txt`.
    pub inquiries: usize,
}

/// Mid-price walk shared by the price and market data feeds.
///
/// Starts at 99 with the narrow spread and moves up one 256th per tick,
/// turning around whenever the mid lands on 99 or 101.
#[derive(Debug, Clone)]
pub struct Oscillator {
    mid: f64,
    rising: bool,
    narrow: bool,
}

impl Default for Oscillator {
    fn default() -> Self {
        Oscillator {
            mid: FLOOR_MID,
            rising: true,
            narrow: true,
        }
    }
}

impl Oscillator {
    /// Current mid before the next tick.
    pub fn mid(&self) -> f64 {
        self.mid
    }

    /// Emit the `(bid, offer)` pair for the current tick and advance the walk.
    pub fn tick(&mut self) -> (f64, f64) {
        let half_spread = if self.narrow { TICK } else { WIDE_HALF_SPREAD };
        let quote = (self.mid - half_spread, self.mid + half_spread);
        self.narrow = !self.narrow;

        self.mid += if self.rising { TICK } else { -TICK };
        if (self.mid - FLOOR_MID).abs() < TOLERANCE || (self.mid - CEILING_MID).abs() < TOLERANCE {
            self.rising = !self.rising;
        }
        quote
    }
}

/// Running counter that drives the cyclic trade/inquiry attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cycle {
    count: u64,
}

impl Cycle {
    /// Number of rows generated so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// SELL on even counts, BUY on odd.
    pub fn side(&self) -> Side {
        if self.count % 2 == 0 { Side::Sell } else { Side::Buy }
    }

    /// 99 on even counts, 100 on odd.
    pub fn price(&self) -> f64 {
        if self.count % 2 == 0 { 99.0 } else { 100.0 }
    }

    /// Book label cycling through `TRSY1..TRSY3`.
    pub fn book(&self) -> &'static str {
        BOOKS[(self.count % BOOKS.len() as u64) as usize]
    }

    /// Quantity cycling through 1..=5 million.
    pub fn quantity(&self) -> u64 {
        (self.count % 5 + 1) * LOT
    }

    /// Move on to the next row.
    pub fn advance(&mut self) {
        self.count += 1;
    }
}

/// Random 12-character upper-case alphanumeric identifier.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| char::from(ID_CHARSET[rng.random_range(0..ID_CHARSET.len())]))
        .collect()
}

/// Write `per_security` price rows for every security.
pub fn write_prices<W: Write>(out: &mut W, per_security: usize) -> Result<usize> {
    let mut rows = 0;
    for cusip in Cusip::roster() {
        let mut walk = Oscillator::default();
        for _ in 0..per_security {
            let (bid, offer) = walk.tick();
            writeln!(out, "{},{},{}", cusip, to_fractional(bid), to_fractional(offer))?;
            rows += 1;
        }
    }
    Ok(rows)
}

/// Write `per_security` trades for every security.
pub fn write_trades<W: Write, R: Rng + ?Sized>(
    out: &mut W,
    per_security: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut cycle = Cycle::default();
    for cusip in Cusip::roster() {
        for _ in 0..per_security {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                cusip,
                generate_id(rng),
                to_fractional(cycle.price()),
                cycle.book(),
                cycle.quantity(),
                cycle.side()
            )?;
            cycle.advance();
        }
    }
    Ok(cycle.count() as usize)
}

/// Write `ticks_per_security` BID/OFFER row pairs for every security.
pub fn write_market_data<W: Write>(out: &mut W, ticks_per_security: usize) -> Result<usize> {
    let mut sizes = Cycle::default();
    let mut rows = 0;
    for cusip in Cusip::roster() {
        let mut walk = Oscillator::default();
        for _ in 0..ticks_per_security {
            let quantity = sizes.quantity();
            let (bid, offer) = walk.tick();
            let bid = to_fractional(bid);
            let offer = to_fractional(offer);
            writeln!(out, "{},{},{},{}", cusip, bid, quantity, PricingSide::Bid)?;
            writeln!(out, "{},{},{},{}", cusip, offer, quantity, PricingSide::Offer)?;
            sizes.advance();
            rows += 2;
        }
    }
    Ok(rows)
}

/// Write `per_security` RECEIVED inquiries for every security.
pub fn write_inquiries<W: Write, R: Rng + ?Sized>(
    out: &mut W,
    per_security: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut cycle = Cycle::default();
    for cusip in Cusip::roster() {
        for _ in 0..per_security {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                generate_id(rng),
                cusip,
                cycle.side(),
                cycle.quantity(),
                to_fractional(cycle.price()),
                InquiryState::Received
            )?;
            cycle.advance();
        }
    }
    Ok(cycle.count() as usize)
}

fn write_file<F>(path: &Path, body: F) -> Result<usize>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<usize>,
{
    let mut out = BufWriter::new(File::create(path)?);
    let rows = body(&mut out)?;
    out.flush()?;
    info!("Wrote {} rows to {}", rows, path.display());
    Ok(rows)
}

/// Generate all four feeds into `dir`, replacing any previous files.
pub fn generate_feeds(dir: &Path, sizes: &FeedSizes) -> Result<FeedCounts> {
    let mut rng = rand::rng();
    let prices = write_file(&dir.join(PRICES_FILE), |out| {
        write_prices(out, sizes.prices)
    })?;
    let trades = write_file(&dir.join(TRADES_FILE), |out| {
        write_trades(out, sizes.trades, &mut rng)
    })?;
    let market_data = write_file(&dir.join(MARKET_DATA_FILE), |out| {
        write_market_data(out, sizes.ticks)
    })?;
    let inquiries = write_file(&dir.join(INQUIRIES_FILE), |out| {
        write_inquiries(out, sizes.inquiries, &mut rng)
    })?;
    Ok(FeedCounts {
        prices,
        trades,
        market_data,
        inquiries,
    })
}
