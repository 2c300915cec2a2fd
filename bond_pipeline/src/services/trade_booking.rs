//! Trade booking: trades from `trades.txt` and from executed algo orders.
use std::io::BufRead;

use bond_common::files::BOOKS;
use bond_common::price::from_fractional;
use bond_common::wire::{PricingSide, Side};
use bond_common::{Bond, Result, TradingError};
use crossbeam_channel::Sender;

use crate::model::{ExecutionOrder, Trade};
use crate::soa::connector::{Connector, FeedStats, drive_feed, parse_quantity, split_fields};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::{ServiceListener, deliver};
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on trade id.
pub struct TradeBookingService {
    store: ServiceStore<Trade>,
    inbox: Inbox<Trade>,
    connector: TradeBookingConnector,
}

impl Default for TradeBookingService {
    fn default() -> Self {
        let inbox = Inbox::default();
        let connector = TradeBookingConnector {
            inbox: inbox.sender(),
        };
        Self {
            store: ServiceStore::new("trade_booking"),
            inbox,
            connector,
        }
    }
}

impl TradeBookingService {
    /// Listener that books every executed order as a trade.
    pub fn listener(&self) -> ExecutionBookingListener {
        ExecutionBookingListener {
            target: self.inbox.sender(),
            booked: 0,
        }
    }

    /// Record a trade and notify listeners.
    pub fn book_trade(&mut self, trade: Trade) -> Result<()> {
        self.on_message(trade)
    }

    /// Number of distinct trades booked.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True before the first trade is booked.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

keyed_service!(TradeBookingService, Trade, TradeBookingConnector);

impl Node for TradeBookingService {
    type Message = Trade;

    fn name(&self) -> &'static str {
        "trade_booking"
    }

    fn inbox(&self) -> &Inbox<Trade> {
        &self.inbox
    }

    fn handle(&mut self, trade: Trade) -> Result<()> {
        self.book_trade(trade)
    }
}

/// Turns executed orders into trades, allocating books round-robin.
pub struct ExecutionBookingListener {
    target: Sender<Trade>,
    booked: u64,
}

impl ExecutionBookingListener {
    fn book(&mut self, order: &ExecutionOrder) -> Result<()> {
        let quantity = order
            .visible_quantity
            .checked_add(order.hidden_quantity)
            .filter(|&total| i64::try_from(total).is_ok())
            .ok_or_else(|| {
                TradingError::Overflow(format!(
                    "order {} size {} + {}",
                    order.order_id, order.visible_quantity, order.hidden_quantity
                ))
            })?;
        let book = BOOKS[(self.booked % BOOKS.len() as u64) as usize];
        self.booked += 1;
        let trade = Trade {
            product: order.product.clone(),
            trade_id: order.order_id.clone(),
            price: order.price,
            book: book.to_string(),
            quantity,
            side: match order.side {
                PricingSide::Bid => Side::Buy,
                PricingSide::Offer => Side::Sell,
            },
        };
        deliver(&self.target, "trade_booking", trade)
    }
}

impl ServiceListener<ExecutionOrder> for ExecutionBookingListener {
    fn process_add(&mut self, data: &ExecutionOrder) -> Result<()> {
        self.book(data)
    }

    fn process_update(&mut self, data: &ExecutionOrder) -> Result<()> {
        self.book(data)
    }
}

/// Reads `id,tradeId,price,book,quantity,side` rows.
#[derive(Clone)]
pub struct TradeBookingConnector {
    inbox: Sender<Trade>,
}

/// Decode one `trades.txt` row.
pub fn decode_trade(line: &str) -> Result<Trade> {
    let fields = split_fields(line, 6)?;
    Ok(Trade {
        product: Bond::from_id(fields[0])?,
        trade_id: fields[1].to_string(),
        price: from_fractional(fields[2])?,
        book: fields[3].to_string(),
        quantity: parse_quantity(fields[4])?,
        side: fields[5].parse()?,
    })
}

impl Connector<Trade> for TradeBookingConnector {
    fn publish(&mut self, _data: &Trade) -> Result<()> {
        Ok(())
    }

    fn subscribe(
        &mut self,
        source: &mut dyn BufRead,
        settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        drive_feed("trades", source, &self.inbox, settle, |line| {
            decode_trade(line).map(Some)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderType;
    use crate::soa::Pump;

    #[test]
    fn decodes_trade_rows() {
        let trade = decode_trade("91282CJL6,AB12CD34EF56,99-000,TRSY1,1000000,SELL").unwrap();
        assert_eq!(trade.trade_id, "AB12CD34EF56");
        assert_eq!(trade.price, 99.0);
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.signed_quantity().unwrap(), -1_000_000);
        assert!(decode_trade("91282CJL6,AB12,99-000,TRSY1,lots,SELL").is_err());
        assert!(matches!(
            decode_trade("91282CJL6,AB12,99-000,TRSY1,18446744073709551615,BUY"),
            Err(TradingError::Overflow(_))
        ));
        assert!(decode_trade("91282CJL6,AB12,99-000,TRSY1,1000000,HOLD").is_err());
    }

    fn order(order_id: String, side: PricingSide, visible: u64, hidden: u64) -> ExecutionOrder {
        ExecutionOrder {
            product: Bond::from_id("91282CJL6").unwrap(),
            side,
            order_id,
            order_type: OrderType::Market,
            price: 99.0,
            visible_quantity: visible,
            hidden_quantity: hidden,
            parent_order_id: String::new(),
            is_child_order: false,
        }
    }

    #[test]
    fn executions_are_booked_round_robin() {
        let mut booking = TradeBookingService::default();
        let mut listener = booking.listener();
        let sides = [
            PricingSide::Bid,
            PricingSide::Offer,
            PricingSide::Bid,
            PricingSide::Offer,
        ];
        for (n, side) in sides.into_iter().enumerate() {
            let executed = order(format!("ALGO{}", n), side, 1_000_000, 500_000);
            listener.process_add(&executed).unwrap();
        }
        assert_eq!(booking.pump().unwrap(), 4);
        assert_eq!(booking.len(), 4);
        let books: Vec<String> = (0..4)
            .map(|n| booking.get_data(&format!("ALGO{}", n)).unwrap().book.clone())
            .collect();
        assert_eq!(books, vec!["TRSY1", "TRSY2", "TRSY3", "TRSY1"]);
        let first = booking.get_data("ALGO0").unwrap();
        assert_eq!(first.side, Side::Buy);
        assert_eq!(first.quantity, 1_500_000);
        assert_eq!(booking.get_data("ALGO1").unwrap().side, Side::Sell);
    }

    #[test]
    fn oversized_execution_is_not_booked() {
        let mut booking = TradeBookingService::default();
        let mut listener = booking.listener();
        let max = i64::MAX as u64;
        let wrapping = order("ALGO0".into(), PricingSide::Bid, u64::MAX, 1);
        let too_large = order("ALGO1".into(), PricingSide::Bid, max, 1);
        assert!(matches!(
            listener.process_add(&wrapping),
            Err(TradingError::Overflow(_))
        ));
        assert!(matches!(
            listener.process_add(&too_large),
            Err(TradingError::Overflow(_))
        ));
        listener
            .process_add(&order("ALGO2".into(), PricingSide::Offer, max - 1, 1))
            .unwrap();

        assert_eq!(booking.pump().unwrap(), 1);
        let booked = booking.get_data("ALGO2").unwrap();
        assert_eq!(booked.book, "TRSY1");
        assert_eq!(booked.signed_quantity().unwrap(), -i64::MAX);
    }
}
