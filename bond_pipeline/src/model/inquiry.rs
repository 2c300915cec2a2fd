//! Customer inquiries.
use bond_common::Bond;
use bond_common::price::to_fractional;
use bond_common::wire::{InquiryState, Side};
use serde::Serialize;

use crate::soa::service::{Keyed, Persistable};

/// A customer request for a quote.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Inquiry {
    /// Inquiry identifier; the store key.
    pub inquiry_id: String,
    /// Requested security.
    pub product: Bond,
    /// Customer direction.
    pub side: Side,
    /// Requested face amount.
    pub quantity: u64,
    /// Requested or quoted price.
    pub price: f64,
    /// Life-cycle state.
    pub state: InquiryState,
}

impl Keyed for Inquiry {
    fn key(&self) -> String {
        self.inquiry_id.clone()
    }
}

impl Persistable for Inquiry {
    fn fields(&self) -> Vec<String> {
        vec![
            self.inquiry_id.clone(),
            self.product.product_id.clone(),
            self.side.to_string(),
            self.quantity.to_string(),
            to_fractional(self.price),
            self.state.to_string(),
        ]
    }
}
