//! Valuation rating from the trailing price-to-earnings ratio.

use serde::{Deserialize, Serialize};

/// Below this P/E a stock rates `Buy`.
pub const BUY_BELOW_PE: f64 = 15.0;
/// Up to and including this P/E a stock rates `Hold`.
pub const HOLD_UP_TO_PE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Buy,
    Hold,
    Sell,
    #[serde(rename = "No Rating")]
    NoRating,
}

/// Rates a stock on its P/E ratio. A missing or non-finite ratio has no rating.
pub fn rate_pe(pe_ratio: Option<f64>) -> Rating {
    match pe_ratio.filter(|pe| pe.is_finite()) {
        None => Rating::NoRating,
        Some(pe) if pe < BUY_BELOW_PE => Rating::Buy,
        Some(pe) if pe <= HOLD_UP_TO_PE => Rating::Hold,
        Some(_) => Rating::Sell,
    }
}
