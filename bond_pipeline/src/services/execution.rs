//! Execution service: sends algo orders to the market.
use std::io::BufRead;

use bond_common::Result;
use bond_common::price::to_fractional;
use log::debug;

use crate::model::ExecutionOrder;
use crate::soa::connector::{Connector, FeedStats};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on product id.
pub struct ExecutionService {
    store: ServiceStore<ExecutionOrder>,
    inbox: Inbox<ExecutionOrder>,
    connector: ExecutionConnector,
}

impl Default for ExecutionService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("execution"),
            inbox: Inbox::default(),
            connector: ExecutionConnector::default(),
        }
    }
}

impl ExecutionService {
    /// Listener that feeds algo orders into this service.
    pub fn listener(&self) -> Relay<ExecutionOrder, ExecutionOrder> {
        Relay::new(self.inbox.sender(), "execution", ExecutionOrder::clone)
    }

    /// Send `order` to the market, then record it and notify listeners.
    pub fn execute_order(&mut self, order: ExecutionOrder) -> Result<()> {
        self.connector.publish(&order)?;
        self.on_message(order)
    }

    /// Orders sent so far.
    pub fn executed(&self) -> u64 {
        self.connector.sent
    }
}

keyed_service!(ExecutionService, ExecutionOrder, ExecutionConnector);

impl Node for ExecutionService {
    type Message = ExecutionOrder;

    fn name(&self) -> &'static str {
        "execution"
    }

    fn inbox(&self) -> &Inbox<ExecutionOrder> {
        &self.inbox
    }

    fn handle(&mut self, order: ExecutionOrder) -> Result<()> {
        self.execute_order(order)
    }
}

/// Market-facing side of the execution service.
#[derive(Debug, Default)]
pub struct ExecutionConnector {
    sent: u64,
}

impl Connector<ExecutionOrder> for ExecutionConnector {
    fn publish(&mut self, data: &ExecutionOrder) -> Result<()> {
        self.sent += 1;
        debug!(
            "execute {} {} {} {} @ {}",
            data.order_id,
            data.order_type,
            data.side,
            data.visible_quantity + data.hidden_quantity,
            to_fractional(data.price)
        );
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
