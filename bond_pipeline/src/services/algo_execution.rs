//! Algo execution: crosses the spread when the book is tight.
//!
//! Only books whose top-of-book spread is at most 1/128 are traded. Orders
//! alternate between lifting the best offer (a BID-side order) and hitting the
//! best bid (an OFFER-side order), each for the full size shown at that level.
use bond_common::Result;
use bond_common::wire::PricingSide;
use log::debug;

use crate::model::{ExecutionOrder, OrderBook, OrderType};
use crate::soa::connector::NullConnector;
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Widest spread that is still crossed.
pub const MAX_CROSSING_SPREAD: f64 = 1.0 / 128.0;
const SPREAD_TOLERANCE: f64 = 1e-9;

/// Keyed on product id.
pub struct AlgoExecutionService {
    store: ServiceStore<ExecutionOrder>,
    inbox: Inbox<OrderBook>,
    connector: NullConnector,
    orders: u64,
}

impl Default for AlgoExecutionService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("algo_execution"),
            inbox: Inbox::default(),
            connector: NullConnector,
            orders: 0,
        }
    }
}

impl AlgoExecutionService {
    /// Listener that feeds order books into this service.
    pub fn listener(&self) -> Relay<OrderBook, OrderBook> {
        Relay::new(self.inbox.sender(), "algo_execution", OrderBook::clone)
    }

    /// Orders generated so far.
    pub fn orders(&self) -> u64 {
        self.orders
    }

    /// Cross the spread on `book` if it is tight enough.
    pub fn execute(&mut self, book: &OrderBook) -> Result<()> {
        let Some(top) = book.best_bid_offer() else {
            return Ok(());
        };
        if top.spread() > MAX_CROSSING_SPREAD + SPREAD_TOLERANCE {
            return Ok(());
        }

        let (side, level) = if self.orders % 2 == 0 {
            (PricingSide::Bid, &top.offer)
        } else {
            (PricingSide::Offer, &top.bid)
        };
        self.orders += 1;
        let order = ExecutionOrder {
            product: book.product.clone(),
            side,
            order_id: format!("ALGO{:010}", self.orders),
            order_type: OrderType::Market,
            price: level.price,
            visible_quantity: level.quantity,
            hidden_quantity: 0,
            parent_order_id: String::new(),
            is_child_order: false,
        };
        debug!("algo order {} {} {}", order.order_id, order.side, order.product.ticker);
        self.on_message(order)
    }
}

keyed_service!(AlgoExecutionService, ExecutionOrder, NullConnector);

impl Node for AlgoExecutionService {
    type Message = OrderBook;

    fn name(&self) -> &'static str {
        "algo_execution"
    }

    fn inbox(&self) -> &Inbox<OrderBook> {
        &self.inbox
    }

    fn handle(&mut self, book: OrderBook) -> Result<()> {
        self.execute(&book)
    }
}
