//! Position service: net holdings per book, driven by booked trades.
use bond_common::Result;

use crate::model::{Position, Trade};
use crate::soa::connector::NullConnector;
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on product id.
pub struct PositionService {
    store: ServiceStore<Position>,
    inbox: Inbox<Trade>,
    connector: NullConnector,
}

impl Default for PositionService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("position"),
            inbox: Inbox::default(),
            connector: NullConnector,
        }
    }
}

impl PositionService {
    /// Listener that feeds booked trades into this service.
    pub fn listener(&self) -> Relay<Trade, Trade> {
        Relay::new(self.inbox.sender(), "position", Trade::clone)
    }

    /// Apply `trade` to the position in its security and notify listeners.
    ///
    /// A trade that would overflow the position fails with
    /// [`bond_common::TradingError::Overflow`] and leaves the stored position as it was.
    pub fn add_trade(&mut self, trade: &Trade) -> Result<()> {
        let product_id = trade.product.product_id.as_str();
        let mut position = if self.store.contains(product_id) {
            self.store.get(product_id)?.clone()
        } else {
            Position::new(trade.product.clone())
        };
        position.apply(trade)?;
        self.on_message(position)
    }
}

keyed_service!(PositionService, Position, NullConnector);

impl Node for PositionService {
    type Message = Trade;

    fn name(&self) -> &'static str {
        "position"
    }

    fn inbox(&self) -> &Inbox<Trade> {
        &self.inbox
    }

    fn handle(&mut self, trade: Trade) -> Result<()> {
        self.add_trade(&trade)
    }
}
