//! Institutional ownership summary

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::{mean, round_to};
use crate::error::{Result, ResearchError};

const TOP_HOLDERS: usize = 5;

/// One institutional holder. Percent fields are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRow {
    pub holder: String,
    pub pct_held: f64,
    pub pct_change: Option<f64>,
    pub date_reported: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderTable {
    pub rows: Vec<HolderRow>,
}

impl HolderTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The change column exists when any holder reports a change
    pub fn has_pct_change(&self) -> bool {
        self.rows.iter().any(|row| row.pct_change.is_some())
    }

    pub fn latest_reported(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(|row| row.date_reported).max()
    }
}

/// `pctChange` cell of the top holders list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeColumn {
    /// The source table has no change column; the key is omitted
    Absent,
    Value(Option<f64>),
}

impl ChangeColumn {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl Serialize for ChangeColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopHolder {
    #[serde(rename = "Holder")]
    pub holder: String,
    #[serde(rename = "pctHeld")]
    pub pct_held: f64,
    #[serde(rename = "pctChange", skip_serializing_if = "ChangeColumn::is_absent")]
    pub pct_change: ChangeColumn,
}

/// Direction of the average stake change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OwnershipBias {
    Accumulating,
    Trimming,
}

impl OwnershipBias {
    /// Zero average change counts as trimming
    pub fn from_average_change(avg: f64) -> Self {
        if avg > 0.0 {
            Self::Accumulating
        } else {
            Self::Trimming
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionalSummary {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Reported_Date")]
    pub reported_date: Option<NaiveDate>,
    #[serde(rename = "Top_5_Holders")]
    pub top_holders: Vec<TopHolder>,
    #[serde(rename = "Total_Institutional_Percent_Held")]
    pub total_percent_held: f64,
    #[serde(rename = "Average_Percent_Change")]
    pub average_percent_change: f64,
    #[serde(rename = "Number_Increasing_Stakes")]
    pub increasing: usize,
    #[serde(rename = "Number_Decreasing_Stakes")]
    pub decreasing: usize,
    #[serde(rename = "Bias")]
    pub bias: OwnershipBias,
}

/// Summarize institutional holders for `ticker`.
///
/// Totals cover every holder in the table, not only the top five shown.
pub fn summarize_institutional_ownership(
    ticker: &str,
    table: &HolderTable,
) -> Result<InstitutionalSummary> {
    if table.is_empty() {
        return Err(ResearchError::NoData(format!(
            "No institutional holder data available for '{ticker}'"
        )));
    }

    let has_change = table.has_pct_change();

    let mut sorted: Vec<&HolderRow> = table.rows.iter().collect();
    sorted.sort_by(|a, b| b.pct_held.total_cmp(&a.pct_held));
    let top_holders = sorted
        .into_iter()
        .take(TOP_HOLDERS)
        .map(|row| TopHolder {
            holder: row.holder.clone(),
            pct_held: row.pct_held,
            pct_change: if has_change {
                ChangeColumn::Value(row.pct_change)
            } else {
                ChangeColumn::Absent
            },
        })
        .collect();

    let total_held: f64 = table.rows.iter().map(|row| row.pct_held).sum();

    let changes: Vec<f64> = table.rows.iter().filter_map(|row| row.pct_change).collect();
    let avg_change = mean(&changes).unwrap_or(0.0);
    let increasing = changes.iter().filter(|c| **c > 0.0).count();
    let decreasing = changes.iter().filter(|c| **c < 0.0).count();

    Ok(InstitutionalSummary {
        ticker: ticker.to_string(),
        reported_date: table.latest_reported(),
        top_holders,
        total_percent_held: round_to(total_held * 100.0, 2),
        average_percent_change: round_to(avg_change * 100.0, 2),
        increasing,
        decreasing,
        bias: OwnershipBias::from_average_change(avg_change),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(name: &str, held: f64, change: Option<f64>, date: Option<(i32, u32, u32)>) -> HolderRow {
        HolderRow {
            holder: name.to_string(),
            pct_held: held,
            pct_change: change,
            date_reported: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn table() -> HolderTable {
        HolderTable {
            rows: vec![
                holder("Vanguard Group Inc", 0.0912, Some(0.012), Some((2025, 6, 30))),
                holder("Blackrock Inc.", 0.0731, Some(-0.004), Some((2025, 6, 30))),
                holder("State Street Corp", 0.0402, Some(0.021), Some((2025, 3, 31))),
                holder("FMR, LLC", 0.0255, Some(-0.030), Some((2025, 6, 30))),
                holder("Geode Capital", 0.0221, Some(0.0), Some((2025, 9, 30))),
                holder("Morgan Stanley", 0.0150, None, Some((2025, 6, 30))),
                holder("Northern Trust", 0.0110, Some(0.005), None),
            ],
        }
    }

    #[test]
    fn test_total_covers_every_row() {
        let t = table();
        let summary = summarize_institutional_ownership("AAPL", &t).unwrap();
        let expected: f64 = t.rows.iter().map(|r| r.pct_held).sum::<f64>() * 100.0;
        assert!((summary.total_percent_held - expected).abs() < 0.01);
        assert!((summary.total_percent_held - 27.81).abs() < 1e-9);
    }

    #[test]
    fn test_top_holders_sorted_and_raw() {
        let summary = summarize_institutional_ownership("AAPL", &table()).unwrap();
        assert_eq!(summary.top_holders.len(), 5);
        assert_eq!(summary.top_holders[0].holder, "Vanguard Group Inc");
        assert_eq!(summary.top_holders[0].pct_held, 0.0912);
        assert_eq!(summary.top_holders[4].holder, "Geode Capital");
        assert_eq!(summary.top_holders[1].pct_change, ChangeColumn::Value(Some(-0.004)));
    }

    #[test]
    fn test_change_statistics() {
        let summary = summarize_institutional_ownership("AAPL", &table()).unwrap();
        // mean of 0.012, -0.004, 0.021, -0.030, 0.0, 0.005 = 0.000666...
        assert!((summary.average_percent_change - 0.07).abs() < 1e-9);
        assert_eq!(summary.increasing, 3);
        assert_eq!(summary.decreasing, 2);
        assert_eq!(summary.bias, OwnershipBias::Accumulating);
        assert_eq!(summary.reported_date, NaiveDate::from_ymd_opt(2025, 9, 30));
    }

    #[test]
    fn test_without_change_column() {
        let t = HolderTable {
            rows: vec![
                holder("A", 0.05, None, None),
                holder("B", 0.10, None, None),
            ],
        };
        let summary = summarize_institutional_ownership("X", &t).unwrap();
        assert_eq!(summary.average_percent_change, 0.0);
        assert_eq!(summary.increasing, 0);
        assert_eq!(summary.decreasing, 0);
        assert_eq!(summary.bias, OwnershipBias::Trimming);
        assert_eq!(summary.reported_date, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["Top_5_Holders"][0]["Holder"], "B");
        assert!(json["Top_5_Holders"][0].get("pctChange").is_none());
        assert!(json["Reported_Date"].is_null());
    }

    #[test]
    fn test_missing_change_cell_is_null() {
        let json = serde_json::to_value(summarize_institutional_ownership("X", &table()).unwrap()).unwrap();
        let holders = json["Top_5_Holders"].as_array().unwrap();
        assert_eq!(holders[0]["pctChange"], 0.012);
        assert_eq!(json["Reported_Date"], "2025-09-30");
        assert_eq!(json["Bias"], "Accumulating");

        let t = HolderTable {
            rows: vec![holder("A", 0.2, None, None), holder("B", 0.1, Some(-0.01), None)],
        };
        let json = serde_json::to_value(summarize_institutional_ownership("X", &t).unwrap()).unwrap();
        assert!(json["Top_5_Holders"][0]["pctChange"].is_null());
        assert_eq!(json["Bias"], "Trimming");
    }

    #[test]
    fn test_zero_average_is_trimming() {
        let t = HolderTable {
            rows: vec![holder("A", 0.2, Some(0.01), None), holder("B", 0.1, Some(-0.01), None)],
        };
        let summary = summarize_institutional_ownership("X", &t).unwrap();
        assert_eq!(summary.bias, OwnershipBias::Trimming);
    }

    #[test]
    fn test_empty_table() {
        let err = summarize_institutional_ownership("ZZZZ", &HolderTable::default()).unwrap_err();
        assert_eq!(err.to_string(), "No institutional holder data available for 'ZZZZ'");
    }

    #[test]
    fn test_idempotent_output() {
        let t = table();
        let a = serde_json::to_string(&summarize_institutional_ownership("T", &t).unwrap()).unwrap();
        let b = serde_json::to_string(&summarize_institutional_ownership("T", &t).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
