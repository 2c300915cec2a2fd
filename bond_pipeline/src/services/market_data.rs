//! Market data service: order books built from `marketdata.txt`.
//!
//! The feed carries one level per row. The connector holds each BID row until
//! the OFFER row for the same security arrives and then hands the pair to the
//! service as a one-level book. An OFFER with no pending BID is skipped. A
//! second BID before the OFFER replaces the pending one, and the replaced BID
//! is counted as skipped.
use std::collections::HashMap;
use std::io::BufRead;

use bond_common::price::from_fractional;
use bond_common::wire::PricingSide;
use bond_common::{Bond, Result, TradingError};
use crossbeam_channel::Sender;

use crate::model::{BidOffer, Order, OrderBook};
use crate::soa::connector::{Connector, FeedStats, drive_feed, parse_quantity, split_fields};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on product id.
pub struct MarketDataService {
    store: ServiceStore<OrderBook>,
    inbox: Inbox<OrderBook>,
    connector: MarketDataConnector,
}

impl Default for MarketDataService {
    fn default() -> Self {
        let inbox = Inbox::default();
        let connector = MarketDataConnector {
            inbox: inbox.sender(),
        };
        Self {
            store: ServiceStore::new("market_data"),
            inbox,
            connector,
        }
    }
}

impl MarketDataService {
    /// Top of book for `product_id`.
    pub fn best_bid_offer(&self, product_id: &str) -> Result<BidOffer> {
        self.get_data(product_id)?
            .best_bid_offer()
            .ok_or_else(|| TradingError::NotFound {
                service: "market_data",
                key: format!("{} top of book", product_id),
            })
    }

    /// Book for `product_id` with equal-price levels merged.
    pub fn aggregate_depth(&self, product_id: &str) -> Result<OrderBook> {
        Ok(self.get_data(product_id)?.aggregated())
    }
}

keyed_service!(MarketDataService, OrderBook, MarketDataConnector);

impl Node for MarketDataService {
    type Message = OrderBook;

    fn name(&self) -> &'static str {
        "market_data"
    }

    fn inbox(&self) -> &Inbox<OrderBook> {
        &self.inbox
    }

    fn handle(&mut self, book: OrderBook) -> Result<()> {
        self.on_message(book)
    }
}

/// Reads `id,price,quantity,side` rows and pairs them into books.
#[derive(Clone)]
pub struct MarketDataConnector {
    inbox: Sender<OrderBook>,
}

/// Decode one `marketdata.txt` row into its security and level.
pub fn decode_level(line: &str) -> Result<(Bond, Order)> {
    let fields = split_fields(line, 4)?;
    let product = Bond::from_id(fields[0])?;
    let order = Order {
        price: from_fractional(fields[1])?,
        quantity: parse_quantity(fields[2])?,
        side: fields[3].parse()?,
    };
    Ok((product, order))
}

impl Connector<OrderBook> for MarketDataConnector {
    fn publish(&mut self, _data: &OrderBook) -> Result<()> {
        Ok(())
    }

    fn subscribe(
        &mut self,
        source: &mut dyn BufRead,
        settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        let mut pending_bids: HashMap<String, Order> = HashMap::new();
        drive_feed("market data", source, &self.inbox, settle, |line| {
            let (product, order) = decode_level(line)?;
            match order.side {
                PricingSide::Bid => {
                    let product_id = product.product_id;
                    match pending_bids.insert(product_id.clone(), order) {
                        None => Ok(None),
                        Some(dropped) => Err(TradingError::Parse(format!(
                            "BID for {} at {} replaced before its OFFER arrived",
                            product_id, dropped.price
                        ))),
                    }
                }
                PricingSide::Offer => {
                    let bid = pending_bids.remove(&product.product_id).ok_or_else(|| {
                        TradingError::Parse(format!(
                            "OFFER for {} without a preceding BID",
                            product.product_id
                        ))
                    })?;
                    Ok(Some(OrderBook {
                        product,
                        bid_stack: vec![bid],
                        offer_stack: vec![order],
                    }))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soa::Pump;
    use std::io::Cursor;

    #[test]
    fn pairs_bid_and_offer_rows_into_books() {
        let mut service = MarketDataService::default();
        let mut connector = service.connector().clone();
        let mut feed = Cursor::new(
            "91282CJL6,98-317,1000000,BID\n\
             91282CJL6,99-001,1000000,OFFER\n\
             91282CJP7,99-001,2000000,OFFER\n\
             91282CJP7,98-317,2000000,HOLD\n\
             91282CJP7,98-317,3000000,BID\n\
             91282CJP7,99-003,3000000,OFFER\n"
                .as_bytes(),
        );
        let mut books = 0;
        let stats = connector
            .subscribe(&mut feed, &mut || {
                books += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(books, 2);
        assert_eq!(
            stats,
            FeedStats {
                records: 6,
                skipped: 2,
                delivered: 2
            }
        );

        service.pump().unwrap();
        let top = service.best_bid_offer("91282CJP7").unwrap();
        assert_eq!(top.bid.quantity, 3_000_000);
        assert_eq!(top.spread(), 4.0 / 256.0);
        assert_eq!(service.aggregate_depth("91282CJL6").unwrap().bid_stack.len(), 1);
        assert!(service.best_bid_offer("912810TV0").is_err());
    }

    #[test]
    fn replaced_bid_is_counted_as_skipped() {
        let mut service = MarketDataService::default();
        let mut connector = service.connector().clone();
        let mut feed = Cursor::new(
            "91282CJN2,98-300,1000000,BID\n\
             91282CJN2,98-310,2000000,BID\n\
             91282CJN2,99-000,2000000,OFFER\n"
                .as_bytes(),
        );
        let stats = connector.subscribe(&mut feed, &mut || Ok(())).unwrap();
        assert_eq!(
            stats,
            FeedStats {
                records: 3,
                skipped: 1,
                delivered: 1
            }
        );

        service.pump().unwrap();
        let top = service.best_bid_offer("91282CJN2").unwrap();
        assert_eq!(top.bid.quantity, 2_000_000);
    }

    #[test]
    fn oversized_level_is_rejected() {
        assert!(matches!(
            decode_level("91282CJN2,98-300,18446744073709551615,BID"),
            Err(TradingError::Overflow(_))
        ));
    }
}
