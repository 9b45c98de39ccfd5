//! Year-over-year EPS growth from quarterly income statements
//!
//! Report dates are grouped by calendar month, and reports in the same
//! month of consecutive years are compared. This approximates fiscal-quarter
//! alignment. It holds for companies whose fiscal quarters end on the same
//! month every year, and says nothing about companies that shift their
//! reporting dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{mean, round_to};
use crate::error::{Result, ResearchError};

/// One labelled line of a quarterly statement, keyed by report date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub label: String,
    pub values: Vec<(NaiveDate, Option<f64>)>,
}

/// Quarterly income statement as returned by the market data provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub rows: Vec<StatementRow>,
}

impl IncomeStatement {
    /// True when there is no row or no report date at all
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.values.is_empty())
    }

    /// Rows whose label mentions EPS, in statement order
    pub fn eps_rows(&self) -> impl Iterator<Item = &StatementRow> {
        self.rows
            .iter()
            .filter(|row| row.label.to_lowercase().contains("eps"))
    }
}

/// One same-quarter comparison a year apart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsComparison {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Current_Date")]
    pub current_date: NaiveDate,
    #[serde(rename = "Current_EPS")]
    pub current_eps: f64,
    #[serde(rename = "Previous_Date")]
    pub previous_date: NaiveDate,
    #[serde(rename = "Previous_EPS")]
    pub previous_eps: f64,
    #[serde(rename = "EPS_Change")]
    pub eps_change: f64,
    #[serde(rename = "YoY_Growth_Percent")]
    pub yoy_growth_percent: Option<f64>,
}

/// Aggregate YoY EPS growth for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsGrowthSummary {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Total_Comparisons")]
    pub total_comparisons: usize,
    #[serde(rename = "Average_YoY_Growth")]
    pub average: Option<f64>,
    #[serde(rename = "Max_YoY_Growth")]
    pub max: Option<f64>,
    #[serde(rename = "Min_YoY_Growth")]
    pub min: Option<f64>,
    #[serde(rename = "Standard_Deviation")]
    pub std_dev: Option<f64>,
    #[serde(rename = "Details")]
    pub details: Vec<EpsComparison>,
}

/// Quarter label for a report month
pub fn quarter_label(month: u32) -> String {
    match month {
        3 => "Q1".to_string(),
        6 => "Q2".to_string(),
        9 => "Q3".to_string(),
        12 => "Q4".to_string(),
        other => format!("M{other}"),
    }
}

/// Signed percent growth from `previous` to `current`.
///
/// A zero base has no meaningful percentage: growth from zero to a non-zero
/// value is `None`, zero to zero is `0.0`.
pub fn yoy_growth_percent(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        if current == 0.0 { Some(0.0) } else { None }
    } else {
        let growth = (current - previous) / previous.abs() * 100.0;
        growth.is_finite().then_some(growth)
    }
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Month groups in order of first appearance, each chronological
fn group_by_month(mut points: Vec<(NaiveDate, f64)>) -> Vec<(u32, Vec<(NaiveDate, f64)>)> {
    points.sort_by_key(|(date, _)| *date);
    let mut groups: Vec<(u32, Vec<(NaiveDate, f64)>)> = Vec::new();
    for point in points {
        let month = point.0.month();
        match groups.iter_mut().find(|(m, _)| *m == month) {
            Some((_, group)) => group.push(point),
            None => groups.push((month, vec![point])),
        }
    }
    groups
}

fn compare_row(row: &StatementRow, out: &mut Vec<EpsComparison>) {
    let points: Vec<(NaiveDate, f64)> = row
        .values
        .iter()
        .filter_map(|(date, value)| value.filter(|v| !v.is_nan()).map(|v| (*date, v)))
        .collect();

    for (month, group) in group_by_month(points) {
        let quarter = quarter_label(month);
        for pair in group.windows(2) {
            let (previous_date, previous_eps) = pair[0];
            let (current_date, current_eps) = pair[1];
            // Gaps of two or more years are skipped, not bridged
            if current_date.year() - previous_date.year() != 1 {
                continue;
            }
            out.push(EpsComparison {
                metric: row.label.clone(),
                quarter: quarter.clone(),
                current_date,
                current_eps: round_to(current_eps, 4),
                previous_date,
                previous_eps: round_to(previous_eps, 4),
                eps_change: round_to(current_eps - previous_eps, 4),
                yoy_growth_percent: yoy_growth_percent(current_eps, previous_eps)
                    .map(|g| round_to(g, 2)),
            });
        }
    }
}

/// Pair same-quarter EPS values one year apart and aggregate their growth
pub fn eps_yoy_growth(ticker: &str, statement: &IncomeStatement) -> Result<EpsGrowthSummary> {
    if statement.is_empty() {
        return Err(ResearchError::NoData(format!(
            "No income statement data for '{ticker}'"
        )));
    }

    let mut eps_rows = statement.eps_rows().peekable();
    if eps_rows.peek().is_none() {
        return Err(ResearchError::MissingField(
            "No EPS-related rows found in income statement".to_string(),
        ));
    }

    let mut details = Vec::new();
    for row in eps_rows {
        compare_row(row, &mut details);
    }

    if details.is_empty() {
        return Err(ResearchError::InsufficientData(
            "Not enough data for YoY EPS growth calculation".to_string(),
        ));
    }

    let growth: Vec<f64> = details.iter().filter_map(|d| d.yoy_growth_percent).collect();

    Ok(EpsGrowthSummary {
        ticker: ticker.to_string(),
        total_comparisons: details.len(),
        average: mean(&growth).map(|v| round_to(v, 2)),
        max: growth.iter().copied().reduce(f64::max).map(|v| round_to(v, 2)),
        min: growth.iter().copied().reduce(f64::min).map(|v| round_to(v, 2)),
        std_dev: sample_std_dev(&growth).map(|v| round_to(v, 2)),
        details,
    })
}
