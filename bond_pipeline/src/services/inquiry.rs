//! Inquiry service: customer quote requests and their life cycle.
//!
//! A RECEIVED inquiry is stored and immediately quoted back to the customer
//! at its requested price. The connector acknowledges the quote by returning
//! the inquiry in state QUOTED, which the service then completes as DONE.
use std::io::BufRead;

use bond_common::price::from_fractional;
use bond_common::wire::InquiryState;
use bond_common::{Bond, Result, TradingError};
use crossbeam_channel::Sender;
use log::debug;

use crate::model::Inquiry;
use crate::soa::connector::{Connector, FeedStats, drive_feed, parse_quantity, split_fields};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::deliver;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// Keyed on inquiry id.
pub struct InquiryService {
    store: ServiceStore<Inquiry>,
    inbox: Inbox<Inquiry>,
    connector: InquiryConnector,
}

impl Default for InquiryService {
    fn default() -> Self {
        let inbox = Inbox::default();
        let connector = InquiryConnector {
            inbox: inbox.sender(),
        };
        Self {
            store: ServiceStore::new("inquiry"),
            inbox,
            connector,
        }
    }
}

impl InquiryService {
    /// Quote `price` back on the stored inquiry `inquiry_id`.
    ///
    /// Only a RECEIVED inquiry can be quoted; any other state fails with
    /// [`TradingError::NotQuotable`].
    pub fn send_quote(&mut self, inquiry_id: &str, price: f64) -> Result<()> {
        let mut inquiry = self.store.get(inquiry_id)?.clone();
        inquiry.price = price;
        self.connector.publish(&inquiry)
    }

    /// Reject the stored inquiry `inquiry_id` and notify listeners.
    pub fn reject_inquiry(&mut self, inquiry_id: &str) -> Result<()> {
        let mut inquiry = self.store.get(inquiry_id)?.clone();
        inquiry.state = InquiryState::Rejected;
        self.on_message(inquiry)
    }

    /// Number of inquiries seen.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True before the first inquiry arrives.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

keyed_service!(InquiryService, Inquiry, InquiryConnector);

impl Node for InquiryService {
    type Message = Inquiry;

    fn name(&self) -> &'static str {
        "inquiry"
    }

    fn inbox(&self) -> &Inbox<Inquiry> {
        &self.inbox
    }

    fn handle(&mut self, mut inquiry: Inquiry) -> Result<()> {
        match inquiry.state {
            InquiryState::Received => {
                let (inquiry_id, price) = (inquiry.inquiry_id.clone(), inquiry.price);
                self.on_message(inquiry)?;
                self.send_quote(&inquiry_id, price)
            }
            InquiryState::Quoted => {
                inquiry.state = InquiryState::Done;
                self.on_message(inquiry)
            }
            _ => self.on_message(inquiry),
        }
    }
}

/// Reads `inquiryId,id,side,quantity,price,state` rows; quotes go back out
/// through `publish`.
#[derive(Clone)]
pub struct InquiryConnector {
    inbox: Sender<Inquiry>,
}

/// Decode one `inquiries.txt` row.
pub fn decode_inquiry(line: &str) -> Result<Inquiry> {
    let fields = split_fields(line, 6)?;
    Ok(Inquiry {
        inquiry_id: fields[0].to_string(),
        product: Bond::from_id(fields[1])?,
        side: fields[2].parse()?,
        quantity: parse_quantity(fields[3])?,
        price: from_fractional(fields[4])?,
        state: fields[5].parse()?,
    })
}

impl Connector<Inquiry> for InquiryConnector {
    fn publish(&mut self, data: &Inquiry) -> Result<()> {
        if data.state != InquiryState::Received {
            return Err(TradingError::NotQuotable {
                inquiry_id: data.inquiry_id.clone(),
                state: data.state,
            });
        }
        debug!("quote {} {} @ {}", data.inquiry_id, data.product.ticker, data.price);
        let mut quoted = data.clone();
        quoted.state = InquiryState::Quoted;
        deliver(&self.inbox, "inquiry", quoted)
    }

    fn subscribe(
        &mut self,
        source: &mut dyn BufRead,
        settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        drive_feed("inquiries", source, &self.inbox, settle, |line| {
            decode_inquiry(line).map(Some)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soa::{Pump, ServiceListener};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct StateLog(Rc<RefCell<Vec<String>>>);

    impl ServiceListener<Inquiry> for StateLog {
        fn process_add(&mut self, data: &Inquiry) -> Result<()> {
            self.0.borrow_mut().push(format!("add {}", data.state));
            Ok(())
        }

        fn process_update(&mut self, data: &Inquiry) -> Result<()> {
            self.0.borrow_mut().push(format!("update {}", data.state));
            Ok(())
        }
    }

    #[test]
    fn decodes_inquiry_rows() {
        let inquiry =
            decode_inquiry("Q1W2E3R4T5Y6,91282CJL6,BUY,2000000,100-000,RECEIVED").unwrap();
        assert_eq!(inquiry.product.ticker, "US2Y");
        assert_eq!(inquiry.price, 100.0);
        assert_eq!(inquiry.state, InquiryState::Received);
        assert!(decode_inquiry("Q1,91282CJL6,BUY,2000000,100-000,PENDING").is_err());
        assert!(matches!(
            decode_inquiry("Q1,91282CJL6,BUY,18446744073709551615,100-000,RECEIVED"),
            Err(TradingError::Overflow(_))
        ));
    }

    #[test]
    fn received_inquiry_is_quoted_then_done() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut service = InquiryService::default();
        service.add_listener(Box::new(StateLog(journal.clone())));

        let mut connector = service.connector().clone();
        let mut feed = "Q1W2E3R4T5Y6,91282CJL6,SELL,1000000,99-000,RECEIVED\n".as_bytes();
        connector.subscribe(&mut feed, &mut || Ok(())).unwrap();
        assert_eq!(service.pump().unwrap(), 2);

        assert_eq!(*journal.borrow(), vec!["add RECEIVED", "update DONE"]);
        assert_eq!(
            service.get_data("Q1W2E3R4T5Y6").unwrap().state,
            InquiryState::Done
        );
    }

    #[test]
    fn reject_marks_inquiry_rejected() {
        let mut service = InquiryService::default();
        service
            .on_message(decode_inquiry("Q9,91282CJN2,BUY,1000000,100-000,RECEIVED").unwrap())
            .unwrap();
        service.reject_inquiry("Q9").unwrap();
        assert_eq!(service.get_data("Q9").unwrap().state, InquiryState::Rejected);
        assert!(service.reject_inquiry("missing").is_err());
        assert!(service.send_quote("missing", 99.0).is_err());
    }

    #[test]
    fn only_received_inquiries_can_be_quoted() {
        let mut service = InquiryService::default();
        let mut connector = service.connector().clone();
        let mut feed = "Q7,91282CJN2,SELL,1000000,99-000,RECEIVED\n".as_bytes();
        connector.subscribe(&mut feed, &mut || Ok(())).unwrap();
        service.pump().unwrap();
        assert_eq!(service.get_data("Q7").unwrap().state, InquiryState::Done);

        assert!(matches!(
            service.send_quote("Q7", 99.5),
            Err(TradingError::NotQuotable {
                state: InquiryState::Done,
                ..
            })
        ));
        service.reject_inquiry("Q7").unwrap();
        assert!(matches!(
            service.send_quote("Q7", 99.5),
            Err(TradingError::NotQuotable {
                state: InquiryState::Rejected,
                ..
            })
        ));
        assert_eq!(service.pump().unwrap(), 0);
    }
}
