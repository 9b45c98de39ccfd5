//! Insider purchase/sale activity summary

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::error::{Result, ResearchError};

pub const PURCHASES: &str = "Purchases";
pub const SALES: &str = "Sales";
pub const NET_SHARES: &str = "Net Shares Purchased (Sold)";
pub const PERCENT_NET: &str = "% Net Shares Purchased (Sold)";
pub const PERCENT_BUY: &str = "% Buy Shares";
pub const PERCENT_SELL: &str = "% Sell Shares";
pub const TOTAL_HELD: &str = "Total Insider Shares Held";

/// One labelled line of the insider activity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderRow {
    pub label: String,
    pub shares: Option<f64>,
}

impl InsiderRow {
    pub fn new(label: impl Into<String>, shares: f64) -> Self {
        Self {
            label: label.into(),
            shares: Some(shares),
        }
    }
}

/// Insider activity table as returned by the market data provider.
///
/// `header` is the title of the label column, which carries the reporting
/// window (e.g. "Insider Purchases Last 6m").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsiderTable {
    pub header: String,
    pub rows: Vec<InsiderRow>,
}

impl InsiderTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn lookup(&self, label: &str) -> Result<f64> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .and_then(|row| row.shares)
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                ResearchError::MissingField(format!("Missing insider activity field '{label}'"))
            })
    }

    /// Reporting window, absent for placeholder headers
    pub fn reported_date(&self) -> Option<String> {
        let header = self.header.trim();
        if header.is_empty() || header.contains("Unnamed") {
            None
        } else {
            Some(header.to_string())
        }
    }
}

/// Typed view of the seven insider figures. Percent fields are fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsiderActivity {
    pub purchases: f64,
    pub sales: f64,
    pub net_shares: f64,
    pub percent_net: f64,
    pub percent_buy: f64,
    pub percent_sell: f64,
    pub total_held: f64,
}

impl InsiderActivity {
    /// Look up every required label, failing on the first one missing
    pub fn parse(table: &InsiderTable) -> Result<Self> {
        Ok(Self {
            purchases: table.lookup(PURCHASES)?,
            sales: table.lookup(SALES)?,
            net_shares: table.lookup(NET_SHARES)?,
            percent_net: table.lookup(PERCENT_NET)?,
            percent_buy: table.lookup(PERCENT_BUY)?,
            percent_sell: table.lookup(PERCENT_SELL)?,
            total_held: table.lookup(TOTAL_HELD)?,
        })
    }
}

/// Direction of net insider trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetBias {
    Buying,
    Selling,
}

impl NetBias {
    /// Zero net shares counts as selling
    pub fn from_net_shares(net: f64) -> Self {
        if net > 0.0 { Self::Buying } else { Self::Selling }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsiderSummary {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Reported_Date")]
    pub reported_date: Option<String>,
    #[serde(rename = "Purchases_6m")]
    pub purchases: i64,
    #[serde(rename = "Sales_6m")]
    pub sales: i64,
    #[serde(rename = "Net_Shares")]
    pub net_shares: i64,
    #[serde(rename = "Percent_Net_Change")]
    pub percent_net_change: f64,
    #[serde(rename = "Percent_Buy")]
    pub percent_buy: f64,
    #[serde(rename = "Percent_Sell")]
    pub percent_sell: f64,
    #[serde(rename = "Total_Shares_Held")]
    pub total_shares_held: i64,
    #[serde(rename = "Net_Bias")]
    pub net_bias: NetBias,
}

fn as_percent(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 2)
}

/// Summarize insider activity for `ticker`
pub fn summarize_insider_activity(ticker: &str, table: &InsiderTable) -> Result<InsiderSummary> {
    if table.is_empty() {
        return Err(ResearchError::NoData(format!(
            "No insider activity available for '{ticker}'"
        )));
    }

    let activity = InsiderActivity::parse(table)?;

    Ok(InsiderSummary {
        ticker: ticker.to_string(),
        reported_date: table.reported_date(),
        purchases: activity.purchases.trunc() as i64,
        sales: activity.sales.trunc() as i64,
        net_shares: activity.net_shares.trunc() as i64,
        percent_net_change: as_percent(activity.percent_net),
        percent_buy: as_percent(activity.percent_buy),
        percent_sell: as_percent(activity.percent_sell),
        total_shares_held: activity.total_held.trunc() as i64,
        net_bias: NetBias::from_net_shares(activity.net_shares),
    })
}
