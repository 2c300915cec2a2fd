//! GUI service: a throttled view of the internal prices.
//!
//! Every price is stored, but only ticks at least `throttle` apart are
//! published, and publishing stops after `max_updates` ticks.
use std::io::BufRead;
use std::time::{Duration, Instant};

use bond_common::Result;
use bond_common::price::to_fractional;
use log::info;

use crate::model::Price;
use crate::soa::connector::{Connector, FeedStats};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Default minimum gap between published ticks.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(300);
/// Default cap on published ticks.
pub const DEFAULT_MAX_UPDATES: usize = 100;

/// Keyed on product id.
pub struct GuiService {
    store: ServiceStore<Price>,
    inbox: Inbox<Price>,
    connector: GuiConnector,
    throttle: Duration,
    max_updates: usize,
    last_published: Option<Instant>,
}

impl Default for GuiService {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE, DEFAULT_MAX_UPDATES)
    }
}

impl GuiService {
    /// GUI service with an explicit throttle policy.
    pub fn new(throttle: Duration, max_updates: usize) -> Self {
        Self {
            store: ServiceStore::new("gui"),
            inbox: Inbox::default(),
            connector: GuiConnector::default(),
            throttle,
            max_updates,
            last_published: None,
        }
    }

    /// Listener that feeds pricing updates into this service.
    pub fn listener(&self) -> Relay<Price, Price> {
        Relay::new(self.inbox.sender(), "gui", Price::clone)
    }

    /// Ticks published so far.
    pub fn published(&self) -> usize {
        self.connector.published
    }

    fn due(&self, now: Instant) -> bool {
        if self.connector.published >= self.max_updates {
            return false;
        }
        match self.last_published {
            Some(last) => now.duration_since(last) >= self.throttle,
            None => true,
        }
    }
}

keyed_service!(GuiService, Price, GuiConnector);

impl Node for GuiService {
    type Message = Price;

    fn name(&self) -> &'static str {
        "gui"
    }

    fn inbox(&self) -> &Inbox<Price> {
        &self.inbox
    }

    fn handle(&mut self, price: Price) -> Result<()> {
        let now = Instant::now();
        if self.due(now) {
            self.connector.publish(&price)?;
            self.last_published = Some(now);
        }
        self.on_message(price)
    }
}

/// Writes throttled ticks to the `gui` log target.
#[derive(Debug, Default)]
pub struct GuiConnector {
    published: usize,
}

impl Connector<Price> for GuiConnector {
    fn publish(&mut self, data: &Price) -> Result<()> {
        self.published += 1;
        info!(
            target: "gui",
            "{} bid {} offer {}",
            data.product.ticker,
            to_fractional(data.bid()),
            to_fractional(data.offer())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soa::Pump;
    use crate::soa::ServiceListener;
    use bond_common::Bond;

    fn tick(mid: f64) -> Price {
        Price {
            product: Bond::from_id("91282CJJ1").unwrap(),
            mid,
            bid_offer_spread: 1.0 / 128.0,
        }
    }

    #[test]
    fn caps_published_ticks_but_stores_every_price() {
        let mut gui = GuiService::new(Duration::ZERO, 3);
        let mut listener = gui.listener();
        for i in 0..5 {
            listener.process_add(&tick(99.0 + f64::from(i) / 256.0)).unwrap();
        }
        assert_eq!(gui.pump().unwrap(), 5);
        assert_eq!(gui.published(), 3);
        assert_eq!(gui.get_data("91282CJJ1").unwrap().mid, 99.0 + 4.0 / 256.0);
    }

    #[test]
    fn throttle_suppresses_bursts() {
        let mut gui = GuiService::new(Duration::from_secs(3600), 100);
        let mut listener = gui.listener();
        for _ in 0..10 {
            listener.process_update(&tick(99.0)).unwrap();
        }
        gui.pump().unwrap();
        assert_eq!(gui.published(), 1);
    }
}
