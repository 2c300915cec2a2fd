//! Algo streaming: turns internal prices into two-way price streams.
use bond_common::Result;
use bond_common::wire::PricingSide;

use crate::model::{Price, PriceStream, PriceStreamOrder};
use crate::soa::connector::NullConnector;
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

const SMALL_SIZE: u64 = 1_000_000;
const LARGE_SIZE: u64 = 2_000_000;

/// Keyed on product id.
pub struct AlgoStreamingService {
    store: ServiceStore<PriceStream>,
    inbox: Inbox<Price>,
    connector: NullConnector,
    streamed: u64,
}

impl Default for AlgoStreamingService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("algo_streaming"),
            inbox: Inbox::default(),
            connector: NullConnector,
            streamed: 0,
        }
    }
}

impl AlgoStreamingService {
    /// Listener that feeds pricing updates into this service.
    pub fn listener(&self) -> Relay<Price, Price> {
        Relay::new(self.inbox.sender(), "algo_streaming", Price::clone)
    }

    /// Build the next stream for `price`; visible size alternates 1mm/2mm,
    /// hidden size is twice the visible size.
    pub fn publish_price(&mut self, price: &Price) -> Result<()> {
        let visible = if self.streamed % 2 == 0 { SMALL_SIZE } else { LARGE_SIZE };
        self.streamed += 1;
        let leg = |at: f64, side: PricingSide| PriceStreamOrder {
            price: at,
            visible_quantity: visible,
            hidden_quantity: 2 * visible,
            side,
        };
        let stream = PriceStream {
            product: price.product.clone(),
            bid: leg(price.bid(), PricingSide::Bid),
            offer: leg(price.offer(), PricingSide::Offer),
        };
        self.on_message(stream)
    }
}

keyed_service!(AlgoStreamingService, PriceStream, NullConnector);

impl Node for AlgoStreamingService {
    type Message = Price;

    fn name(&self) -> &'static str {
        "algo_streaming"
    }

    fn inbox(&self) -> &Inbox<Price> {
        &self.inbox
    }

    fn handle(&mut self, price: Price) -> Result<()> {
        self.publish_price(&price)
    }
}
