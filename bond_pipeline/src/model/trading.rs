//! Booked trades, positions by book, and PV01 risk.
use std::collections::BTreeMap;

use bond_common::wire::Side;
use bond_common::{Bond, Result, TradingError};
use serde::Serialize;

use crate::soa::service::{Keyed, Persistable};

/// A booked trade.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trade {
    /// Traded security.
    pub product: Bond,
    /// Trade identifier; the store key.
    pub trade_id: String,
    /// Execution price.
    pub price: f64,
    /// Book the trade is allocated to.
    pub book: String,
    /// Face amount.
    pub quantity: u64,
    /// BUY or SELL.
    pub side: Side,
}

impl Trade {
    /// Quantity signed by side: buys add, sells subtract.
    ///
    /// Fails with [`TradingError::Overflow`] if the face amount exceeds `i64::MAX`.
    pub fn signed_quantity(&self) -> Result<i64> {
        let quantity = i64::try_from(self.quantity).map_err(|_| {
            TradingError::Overflow(format!("trade {} quantity {}", self.trade_id, self.quantity))
        })?;
        Ok(match self.side {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        })
    }
}

impl Keyed for Trade {
    fn key(&self) -> String {
        self.trade_id.clone()
    }
}

/// Net position in a bond across books.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Position {
    /// Held security.
    pub product: Bond,
    books: BTreeMap<String, i64>,
    aggregate: i64,
}

impl Position {
    /// Flat position.
    pub fn new(product: Bond) -> Self {
        Position {
            product,
            books: BTreeMap::new(),
            aggregate: 0,
        }
    }

    /// Quantity held in `book`.
    pub fn position(&self, book: &str) -> i64 {
        self.books.get(book).copied().unwrap_or(0)
    }

    /// Signed quantity per book, in book order.
    pub fn books(&self) -> &BTreeMap<String, i64> {
        &self.books
    }

    /// Sum over all books.
    pub fn aggregate(&self) -> i64 {
        self.aggregate
    }

    /// Apply a trade to its book.
    ///
    /// Fails with [`TradingError::Overflow`] if the book or the aggregate
    /// would leave the `i64` range; the position is then left unchanged.
    pub fn apply(&mut self, trade: &Trade) -> Result<()> {
        let delta = trade.signed_quantity()?;
        let overflow = || {
            TradingError::Overflow(format!(
                "{} position in {} after trade {}",
                self.product.product_id, trade.book, trade.trade_id
            ))
        };
        let book = self
            .position(&trade.book)
            .checked_add(delta)
            .ok_or_else(overflow)?;
        let aggregate = self.aggregate.checked_add(delta).ok_or_else(overflow)?;
        self.books.insert(trade.book.clone(), book);
        self.aggregate = aggregate;
        Ok(())
    }
}

impl Keyed for Position {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

impl Persistable for Position {
    fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.product.product_id.clone()];
        for (book, quantity) in &self.books {
            fields.push(book.clone());
            fields.push(quantity.to_string());
        }
        fields.push(self.aggregate().to_string());
        fields
    }
}

/// PV01 risk of a position.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pv01 {
    /// Risked security.
    pub product: Bond,
    /// PV01 per unit of face.
    pub pv01: f64,
    /// Aggregate position the risk applies to.
    pub quantity: i64,
}

impl Pv01 {
    /// Total risk: per-unit PV01 times quantity.
    pub fn total(&self) -> f64 {
        self.pv01 * self.quantity as f64
    }
}

impl Keyed for Pv01 {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

impl Persistable for Pv01 {
    fn fields(&self) -> Vec<String> {
        vec![
            self.product.product_id.clone(),
            self.pv01.to_string(),
            self.quantity.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(book: &str, quantity: u64, side: Side) -> Trade {
        Trade {
            product: Bond::from_id("91282CJN2").unwrap(),
            trade_id: "T1".into(),
            price: 99.0,
            book: book.into(),
            quantity,
            side,
        }
    }

    #[test]
    fn position_nets_buys_and_sells_per_book() {
        let mut position = Position::new(Bond::from_id("91282CJN2").unwrap());
        position.apply(&trade("TRSY1", 3_000_000, Side::Buy)).unwrap();
        position.apply(&trade("TRSY1", 1_000_000, Side::Sell)).unwrap();
        position.apply(&trade("TRSY3", 2_000_000, Side::Sell)).unwrap();
        assert_eq!(position.position("TRSY1"), 2_000_000);
        assert_eq!(position.position("TRSY2"), 0);
        assert_eq!(position.aggregate(), 0);
        assert_eq!(
            position.fields(),
            vec!["91282CJN2", "TRSY1", "2000000", "TRSY3", "-2000000", "0"]
        );
    }

    #[test]
    fn oversized_trade_is_rejected_not_wrapped() {
        let oversized = trade("TRSY1", u64::MAX, Side::Buy);
        assert!(matches!(oversized.signed_quantity(), Err(TradingError::Overflow(_))));

        let mut position = Position::new(Bond::from_id("91282CJN2").unwrap());
        assert!(position.apply(&oversized).is_err());
        assert_eq!(position.position("TRSY1"), 0);
        assert!(position.books().is_empty());
    }

    #[test]
    fn overflowing_book_leaves_position_unchanged() {
        let max = i64::MAX as u64;
        let mut position = Position::new(Bond::from_id("91282CJN2").unwrap());
        position.apply(&trade("TRSY1", max, Side::Buy)).unwrap();
        assert!(matches!(
            position.apply(&trade("TRSY1", max, Side::Buy)),
            Err(TradingError::Overflow(_))
        ));
        assert_eq!(position.position("TRSY1"), i64::MAX);

        // Each book fits but the aggregate would not.
        assert!(position.apply(&trade("TRSY2", 1, Side::Buy)).is_err());
        assert_eq!(position.position("TRSY2"), 0);
        assert_eq!(position.aggregate(), i64::MAX);

        position.apply(&trade("TRSY2", 5, Side::Sell)).unwrap();
        assert_eq!(position.aggregate(), i64::MAX - 5);
    }

    #[test]
    fn pv01_fields_and_total() {
        let risk = Pv01 {
            product: Bond::from_id("91282CJN2").unwrap(),
            pv01: 0.05,
            quantity: -1_000_000,
        };
        assert_eq!(risk.fields(), vec!["91282CJN2", "0.05", "-1000000"]);
        assert_eq!(risk.total(), -50_000.0);
    }
}
