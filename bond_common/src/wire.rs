//! Enumerations that appear verbatim in feed and sink text.
//!
//! Every variant renders (and parses) as the upper-case token used in the
//! files, so generators and connectors share one spelling.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Direction of a trade or inquiry.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, Hash, Eq, PartialEq)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Side of a two-way market: resting bids or offers.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, Hash, Eq, PartialEq)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PricingSide {
    Bid,
    Offer,
}

/// Life-cycle of a customer inquiry.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, Hash, Eq, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryState {
    Received,
    Quoted,
    Done,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_feed_spelling() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(PricingSide::Offer.to_string(), "OFFER");
        assert_eq!(InquiryState::Rejected.to_string(), "REJECTED");
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!("RECEIVED".parse::<InquiryState>().unwrap(), InquiryState::Received);
        assert!("HOLD".parse::<Side>().is_err());
        assert!("CUSTOMER_REJECTED".parse::<InquiryState>().is_err());
    }
}
