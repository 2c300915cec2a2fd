//! Streaming service: publishes two-way price streams to clients.
use std::io::BufRead;

use bond_common::Result;
use bond_common::price::to_fractional;
use log::debug;

use crate::model::PriceStream;
use crate::soa::connector::{Connector, FeedStats};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on product id.
pub struct StreamingService {
    store: ServiceStore<PriceStream>,
    inbox: Inbox<PriceStream>,
    connector: StreamingConnector,
}

impl Default for StreamingService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("streaming"),
            inbox: Inbox::default(),
            connector: StreamingConnector::default(),
        }
    }
}

impl StreamingService {
    /// Listener that feeds algo streams into this service.
    pub fn listener(&self) -> Relay<PriceStream, PriceStream> {
        Relay::new(self.inbox.sender(), "streaming", PriceStream::clone)
    }

    /// Publish a stream through the connector.
    pub fn publish_price(&mut self, stream: &PriceStream) -> Result<()> {
        self.connector.publish(stream)
    }

    /// Streams published so far.
    pub fn published(&self) -> u64 {
        self.connector.published
    }
}

keyed_service!(StreamingService, PriceStream, StreamingConnector);

impl Node for StreamingService {
    type Message = PriceStream;

    fn name(&self) -> &'static str {
        "streaming"
    }

    fn inbox(&self) -> &Inbox<PriceStream> {
        &self.inbox
    }

    fn handle(&mut self, stream: PriceStream) -> Result<()> {
        self.publish_price(&stream)?;
        self.on_message(stream)
    }
}

/// Client-facing side of the streaming service.
#[derive(Debug, Default)]
pub struct StreamingConnector {
    published: u64,
}

impl Connector<PriceStream> for StreamingConnector {
    fn publish(&mut self, data: &PriceStream) -> Result<()> {
        self.published += 1;
        debug!(
            "stream {} {}x{} / {}x{}",
            data.product.ticker,
            to_fractional(data.bid.price),
            data.bid.visible_quantity,
            to_fractional(data.offer.price),
            data.offer.visible_quantity
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
