//! Deterministic analytics engines
//!
//! Every engine is a pure function from an already-fetched provider table
//! to a serializable summary. Rerunning an engine on the same input yields
//! the same summary.

pub mod growth;
pub mod insider;
pub mod institutional;
pub mod quarter;
pub mod rsi;

pub use growth::{EpsComparison, EpsGrowthSummary, IncomeStatement, StatementRow, eps_yoy_growth};
pub use insider::{
    InsiderActivity, InsiderRow, InsiderSummary, InsiderTable, NetBias, summarize_insider_activity,
};
pub use institutional::{
    ChangeColumn, HolderRow, HolderTable, InstitutionalSummary, OwnershipBias, TopHolder,
    summarize_institutional_ownership,
};
pub use quarter::{current_quarter, most_recent_quarter};
pub use rsi::{PricePoint, PriceSeries, RsiSignal, RsiSummary, compute_rsi, summarize_rsi};

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Mean of a slice, `None` when empty
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert!((round_to(12.345_67, 2) - 12.35).abs() < 1e-12);
        assert!((round_to(1.234_56, 4) - 1.2346).abs() < 1e-12);
        assert!((round_to(-0.5049, 2) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
