//! Pricing service: internal mid/spread prices read from `prices.txt`.
use std::io::BufRead;

use bond_common::price::from_fractional;
use bond_common::{Bond, Result};
use crossbeam_channel::Sender;

use crate::model::Price;
use crate::soa::connector::{Connector, FeedStats, drive_feed, split_fields};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on product id; root of the price flow.
pub struct PricingService {
    store: ServiceStore<Price>,
    inbox: Inbox<Price>,
    connector: PricingConnector,
}

impl Default for PricingService {
    fn default() -> Self {
        let inbox = Inbox::default();
        let connector = PricingConnector {
            inbox: inbox.sender(),
        };
        Self {
            store: ServiceStore::new("pricing"),
            inbox,
            connector,
        }
    }
}

impl PricingService {
    /// Number of securities priced so far.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True before the first price arrives.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

keyed_service!(PricingService, Price, PricingConnector);

impl Node for PricingService {
    type Message = Price;

    fn name(&self) -> &'static str {
        "pricing"
    }

    fn inbox(&self) -> &Inbox<Price> {
        &self.inbox
    }

    fn handle(&mut self, price: Price) -> Result<()> {
        self.on_message(price)
    }
}

/// Reads `id,bid,offer` rows into the pricing service.
#[derive(Clone)]
pub struct PricingConnector {
    inbox: Sender<Price>,
}

/// Decode one `prices.txt` row.
pub fn decode_price(line: &str) -> Result<Price> {
    let fields = split_fields(line, 3)?;
    let product = Bond::from_id(fields[0])?;
    let bid = from_fractional(fields[1])?;
    let offer = from_fractional(fields[2])?;
    Ok(Price::from_bid_offer(product, bid, offer))
}

impl Connector<Price> for PricingConnector {
    fn publish(&mut self, _data: &Price) -> Result<()> {
        Ok(())
    }

    fn subscribe(
        &mut self,
        source: &mut dyn BufRead,
        settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        drive_feed("prices", source, &self.inbox, settle, |line| {
            decode_price(line).map(Some)
        })
    }
}
