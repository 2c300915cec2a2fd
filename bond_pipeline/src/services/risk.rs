//! Risk service: PV01 exposure of each position.
use bond_common::securities::pv01;
use bond_common::{Bond, Result};

use crate::model::{Position, Pv01};
use crate::soa::connector::NullConnector;
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::Relay;
use crate::soa::service::{Service, ServiceStore, keyed_service};

/// A named group of securities whose risk is reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSector {
    /// Sector label, e.g. `FrontEnd`.
    pub name: String,
    /// Member securities.
    pub products: Vec<Bond>,
}

impl BucketedSector {
    /// Sector over `products`.
    pub fn new(name: impl Into<String>, products: Vec<Bond>) -> Self {
        Self {
            name: name.into(),
            products,
        }
    }
}

/// Keyed on product id.
pub struct RiskService {
    store: ServiceStore<Pv01>,
    inbox: Inbox<Position>,
    connector: NullConnector,
}

impl Default for RiskService {
    fn default() -> Self {
        Self {
            store: ServiceStore::new("risk"),
            inbox: Inbox::default(),
            connector: NullConnector,
        }
    }
}

impl RiskService {
    /// Listener that feeds positions into this service.
    pub fn listener(&self) -> Relay<Position, Position> {
        Relay::new(self.inbox.sender(), "risk", Position::clone)
    }

    /// Recompute the risk of `position` and notify listeners.
    pub fn add_position(&mut self, position: &Position) -> Result<()> {
        let risk = Pv01 {
            product: position.product.clone(),
            pv01: pv01(&position.product.product_id)?,
            quantity: position.aggregate(),
        };
        self.on_message(risk)
    }

    /// Total PV01 over the securities of `sector`. Securities without a
    /// position contribute nothing.
    pub fn bucketed_risk(&self, sector: &BucketedSector) -> f64 {
        sector
            .products
            .iter()
            .filter_map(|bond| self.store.get(&bond.product_id).ok())
            .map(Pv01::total)
            .sum()
    }
}

keyed_service!(RiskService, Pv01, NullConnector);

impl Node for RiskService {
    type Message = Position;

    fn name(&self) -> &'static str {
        "risk"
    }

    fn inbox(&self) -> &Inbox<Position> {
        &self.inbox
    }

    fn handle(&mut self, position: Position) -> Result<()> {
        self.add_position(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Trade;
    use approx::assert_relative_eq;
    use bond_common::wire::Side;

    fn position(id: &str, book: &str, quantity: i64) -> Position {
        let product = Bond::from_id(id).unwrap();
        let mut position = Position::new(product.clone());
        let trade = Trade {
            product,
            trade_id: "T1".into(),
            price: 99.0,
            book: book.to_string(),
            quantity: quantity.unsigned_abs(),
            side: if quantity < 0 { Side::Sell } else { Side::Buy },
        };
        position.apply(&trade).unwrap();
        position
    }

    #[test]
    fn risk_uses_aggregate_position_and_static_pv01() {
        let mut risk = RiskService::default();
        risk.add_position(&position("91282CJL6", "TRSY1", 2_000_000)).unwrap();
        let entry = risk.get_data("91282CJL6").unwrap();
        assert_eq!(entry.pv01, 0.02);
        assert_eq!(entry.quantity, 2_000_000);
    }

    #[test]
    fn bucketed_risk_sums_members_only() {
        let mut risk = RiskService::default();
        risk.add_position(&position("91282CJL6", "TRSY1", 1_000_000)).unwrap();
        risk.add_position(&position("91282CJP7", "TRSY2", -2_000_000)).unwrap();
        risk.add_position(&position("912810TV0", "TRSY3", 5_000_000)).unwrap();

        let front_end = BucketedSector::new(
            "FrontEnd",
            ["91282CJL6", "91282CJP7", "91282CJN2"]
                .into_iter()
                .map(|id| Bond::from_id(id).unwrap())
                .collect(),
        );
        assert_relative_eq!(risk.bucketed_risk(&front_end), 20_000.0 - 60_000.0);
    }
}
