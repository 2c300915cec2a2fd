//! Internal prices and the two-way streams built from them.
use bond_common::Bond;
use bond_common::price::to_fractional;
use bond_common::wire::PricingSide;
use serde::Serialize;

use crate::soa::service::{Keyed, Persistable};

/// Mid price and bid/offer spread for a bond.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Price {
    /// Priced security.
    pub product: Bond,
    /// Mid price.
    pub mid: f64,
    /// Offer minus bid.
    pub bid_offer_spread: f64,
}

impl Price {
    /// Build a price from a two-way quote.
    pub fn from_bid_offer(product: Bond, bid: f64, offer: f64) -> Self {
        Price {
            product,
            mid: (bid + offer) / 2.0,
            bid_offer_spread: offer - bid,
        }
    }

    /// Bid implied by mid and spread.
    pub fn bid(&self) -> f64 {
        self.mid - self.bid_offer_spread / 2.0
    }

    /// Offer implied by mid and spread.
    pub fn offer(&self) -> f64 {
        self.mid + self.bid_offer_spread / 2.0
    }
}

impl Keyed for Price {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

/// One side of a price stream.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceStreamOrder {
    /// Quoted price.
    pub price: f64,
    /// Displayed size.
    pub visible_quantity: u64,
    /// Reserve size.
    pub hidden_quantity: u64,
    /// BID or OFFER.
    pub side: PricingSide,
}

impl PriceStreamOrder {
    fn fields(&self) -> [String; 4] {
        [
            to_fractional(self.price),
            self.visible_quantity.to_string(),
            self.hidden_quantity.to_string(),
            self.side.to_string(),
        ]
    }
}

/// Two-way stream published to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceStream {
    /// Streamed security.
    pub product: Bond,
    /// Bid side.
    pub bid: PriceStreamOrder,
    /// Offer side.
    pub offer: PriceStreamOrder,
}

impl Keyed for PriceStream {
    fn key(&self) -> String {
        self.product.product_id.clone()
    }
}

impl Persistable for PriceStream {
    fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.product.product_id.clone()];
        fields.extend(self.bid.fields());
        fields.extend(self.offer.fields());
        fields
    }
}
