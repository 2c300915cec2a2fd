//! Security master: the fixed roster of on-the-run treasuries.
//!
//! Every feed row and service value refers to a bond by its 9-character
//! CUSIP. Static reference data (ticker, coupon, maturity, PV01) is looked up
//! from the table below; nothing is ever added at runtime.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::TradingError;
use crate::result::Result;

/// Format of the maturity dates in the reference table.
const MATURITY_FORMAT: &str = "%Y/%m/%d";

/// Treasuries known to the system, 2Y through 30Y.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, EnumIter, Hash, Eq, PartialEq,
)]
pub enum Cusip {
    /// US 2-year note.
    #[strum(serialize = "91282CJL6")]
    Us2Y,
    /// US 3-year note.
    #[strum(serialize = "91282CJP7")]
    Us3Y,
    /// US 5-year note.
    #[strum(serialize = "91282CJN2")]
    Us5Y,
    /// US 7-year note.
    #[strum(serialize = "91282CJM4")]
    Us7Y,
    /// US 10-year note.
    #[strum(serialize = "91282CJJ1")]
    Us10Y,
    /// US 20-year bond.
    #[strum(serialize = "912810TW8")]
    Us20Y,
    /// US 30-year bond.
    #[strum(serialize = "912810TV0")]
    Us30Y,
}

/// Static reference row for one security.
struct Reference {
    ticker: &'static str,
    coupon: f64,
    maturity: &'static str,
    pv01: f64,
}

impl Cusip {
    /// All securities in tenor order; generators iterate this roster.
    pub fn roster() -> Vec<Cusip> {
        Cusip::iter().collect()
    }

    fn reference(self) -> Reference {
        let (ticker, coupon, maturity, pv01) = match self {
            Cusip::Us2Y => ("US2Y", 0.04875, "2025/11/30", 0.02),
            Cusip::Us3Y => ("US3Y", 0.04375, "2026/12/15", 0.03),
            Cusip::Us5Y => ("US5Y", 0.04375, "2028/11/30", 0.05),
            Cusip::Us7Y => ("US7Y", 0.04375, "2030/11/30", 0.07),
            Cusip::Us10Y => ("US10Y", 0.04500, "2033/11/15", 0.1),
            Cusip::Us20Y => ("US20Y", 0.04750, "2043/11/15", 0.2),
            Cusip::Us30Y => ("US30Y", 0.04750, "2053/11/15", 0.3),
        };
        Reference {
            ticker,
            coupon,
            maturity,
            pv01,
        }
    }

    /// PV01 risk weight per unit of face.
    pub fn pv01(self) -> f64 {
        self.reference().pv01
    }
}

/// Identifier scheme of a bond's product id. The roster is CUSIP only.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, Hash, Eq, PartialEq)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BondIdType {
    Cusip,
}

/// An immutable treasury security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bond {
    /// CUSIP identifier.
    pub product_id: String,
    /// Identifier scheme (always CUSIP for the roster).
    pub id_type: BondIdType,
    /// Display ticker such as `US10Y`.
    pub ticker: String,
    /// Annual coupon rate as a decimal.
    pub coupon: f64,
    /// Maturity date.
    pub maturity: NaiveDate,
}

impl Bond {
    /// Build the bond for a roster entry.
    ///
    /// Fails with [`TradingError::Parse`] if the reference maturity date is malformed.
    pub fn new(cusip: Cusip) -> Result<Self> {
        let reference = cusip.reference();
        Ok(Bond {
            product_id: cusip.to_string(),
            id_type: BondIdType::Cusip,
            ticker: reference.ticker.to_string(),
            coupon: reference.coupon,
            maturity: parse_maturity(reference.maturity)?,
        })
    }

    /// Look a bond up by its identifier string.
    pub fn from_id(product_id: &str) -> Result<Self> {
        Bond::new(parse_cusip(product_id)?)
    }
}

/// Resolve an identifier string into a roster entry.
pub fn parse_cusip(product_id: &str) -> Result<Cusip> {
    product_id
        .trim()
        .parse::<Cusip>()
        .map_err(|_| TradingError::UnknownSecurity(product_id.to_string()))
}

/// Static PV01 for an identifier string.
pub fn pv01(product_id: &str) -> Result<f64> {
    Ok(parse_cusip(product_id)?.pv01())
}

/// Parse a `YYYY/MM/DD` maturity date.
pub fn parse_maturity(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, MATURITY_FORMAT)
        .map_err(|e| TradingError::Parse(format!("maturity '{}': {}", text, e)))
}
