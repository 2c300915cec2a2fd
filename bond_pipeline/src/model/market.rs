//! Order books and the execution orders derived from them.
use bond_common::Bond;
use bond_common::price::to_fractional;
use bond_common::wire::PricingSide;
use serde::Serialize;
use strum_macros::Display;

use crate::soa::service::{Keyed, Persistable};

/// A single resting level.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Order {
    /// Level price.
    pub price: f64,
    /// Size at the level.
    pub quantity: u64,
    /// BID or OFFER.
    pub side: PricingSide,
}

/// Best bid and best offer of a book.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BidOffer {
    /// Highest bid.
    pub bid: Order,
    /// Lowest offer.
    pub offer: Order,
}

impl BidOffer {
    /// Offer minus bid.
    pub fn spread(&self) -> f64 {
        self.offer.price - self.bid.price
    }
}

/// Bid and offer stacks for one bond.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderBook {
    /// Security the book belongs to.
    pub product: Bond,
    /// Bid levels in arrival order.
    pub bid_stack: Vec<Order>,
    /// Offer levels in arrival order.
    pub offer_stack: Vec<Order>,
}

impl OrderBook {
    /// Highest bid and lowest offer, if both sides are populated.
    pub fn best_bid_offer(&self) -> Option<BidOffer> {
        let bid = self
            .bid_stack
            .iter()
            .max_by(|a, b| a.price.total_cmp(&b.price))?;
        let offer = self
            .offer_stack
            .iter()
            .min_by(|a, b| a.price.total_cmp(&b.price))?;
        Some(BidOffer {
            bid: bid.clone(),
            offer: offer.clone(),
        })
    }

    /// Book with levels at equal price merged, bids descending and offers ascending.
    pub fn aggregated(&self) -> OrderBook {
        OrderBook {
            product: self.product.clone(),
            bid_stack: merge_levels(&self.bid_stack, true),
            offer_stack: merge_levels(&self.offer_stack, false),
        }
    }
}

fn merge_levels(levels: &[Order], descending: bool) -> Vec<Order> {
    let mut merged: Vec<Order> = Vec::new();
    for level in levels {
        match merged.iter_mut().find(|m| m.price == level.price) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(level.quantity)
            }
            None => merged.push(level.clone()),
        }
    }
    merged.sort_by(|a, b| {
        if descending {
            b.price.total_cmp(&a.price)
        } else {
            a.price.total_cmp(&b.price)
        }
    });
    merged
}

impl Keyed for OrderBook {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

/// Order type sent to the market. Algo orders cross the book at once, so
/// MARKET is the only type produced.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Display, PartialEq, Eq)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

/// Order produced by algorithmic execution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExecutionOrder {
    /// Traded security.
    pub product: Bond,
    /// BID to buy (lifting the offer), OFFER to sell (hitting the bid).
    pub side: PricingSide,
    /// Order identifier.
    pub order_id: String,
    /// Order type.
    pub order_type: OrderType,
    /// Limit or execution price.
    pub price: f64,
    /// Displayed size.
    pub visible_quantity: u64,
    /// Reserve size.
    pub hidden_quantity: u64,
    /// Parent order identifier for child orders.
    pub parent_order_id: String,
    /// Whether this is a child order.
    pub is_child_order: bool,
}

impl Keyed for ExecutionOrder {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

impl Persistable for ExecutionOrder {
    fn fields(&self) -> Vec<String> {
        vec![
            self.product.product_id.clone(),
            self.side.to_string(),
            self.order_id.clone(),
            self.order_type.to_string(),
            to_fractional(self.price),
            self.visible_quantity.to_string(),
            self.hidden_quantity.to_string(),
            self.parent_order_id.clone(),
            if self.is_child_order { "True" } else { "False" }.to_string(),
        ]
    }
}
