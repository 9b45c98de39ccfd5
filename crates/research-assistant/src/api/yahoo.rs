//! Yahoo Finance client
//!
//! Price history goes through `yahoo_finance_api`. Ownership and income
//! statement data come from the `quoteSummary` and fundamentals time-series
//! endpoints, which need a session cookie and a crumb token.

use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use yahoo_finance_api as yahoo;

use super::MarketDataProvider;
use crate::analytics::insider::{
    NET_SHARES, PERCENT_BUY, PERCENT_NET, PERCENT_SELL, PURCHASES, SALES, TOTAL_HELD,
};
use crate::analytics::{
    HolderRow, HolderTable, IncomeStatement, InsiderRow, InsiderTable, PricePoint, PriceSeries,
    StatementRow,
};
use crate::config::ResearchConfig;
use crate::error::{Result, ResearchError};

const PROVIDER: &str = "Yahoo Finance";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Quarterly income statement lines requested from the time-series endpoint
const INCOME_TYPES: &[&str] = &[
    "quarterlyTotalRevenue",
    "quarterlyNetIncome",
    "quarterlyBasicEPS",
    "quarterlyDilutedEPS",
    "quarterlyNormalizedEPS",
];

/// How far back the income statement request reaches
const STATEMENT_HISTORY_MONTHS: u32 = 72;

/// How long a crumb is trusted before it is fetched again
const CRUMB_TTL: Duration = Duration::from_secs(3600);

/// Crumb token with the time it was obtained
#[derive(Debug)]
struct CrumbCache {
    entry: RwLock<Option<(String, Instant)>>,
    ttl: Duration,
}

impl CrumbCache {
    fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    /// Cached crumb, `None` when absent or older than the TTL
    async fn get(&self) -> Option<String> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|(_, fetched)| fetched.elapsed() < self.ttl)
            .map(|(crumb, _)| crumb.clone())
    }

    async fn store(&self, crumb: String) {
        *self.entry.write().await = Some((crumb, Instant::now()));
    }

    async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}

/// Yahoo Finance client
pub struct YahooFinanceClient {
    http: Client,
    crumb: CrumbCache,
    price_range: String,
}

impl YahooFinanceClient {
    /// Create a client using the configured price window and timeout
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            crumb: CrumbCache::new(CRUMB_TTL),
            price_range: config.price_history_range.clone(),
        })
    }

    /// Session cookie and crumb, fetched on first use and after expiry
    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.get().await {
            return Ok(crumb);
        }

        // The cookie lands in the client's jar; the response body is irrelevant
        self.http.get(COOKIE_URL).send().await?;

        let response = self.http.get(CRUMB_URL).send().await?;
        check_status(response.status())?;
        let body = response.text().await?;
        let crumb = body.trim();
        if crumb.is_empty() || crumb.contains('<') || crumb.len() > 64 {
            return Err(ResearchError::Upstream(format!(
                "{PROVIDER}: could not obtain a crumb token"
            )));
        }
        debug!("Obtained Yahoo crumb");
        self.crumb.store(crumb.to_string()).await;
        Ok(crumb.to_string())
    }

    /// Send a crumb-authenticated request. A rejected crumb is dropped and the
    /// request is sent once more with a fresh one.
    async fn send_with_crumb<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&str) -> reqwest::RequestBuilder + Send + Sync,
    {
        let crumb = self.crumb().await?;
        let response = build(&crumb).send().await?;
        if !is_auth_failure(response.status()) {
            return Ok(response);
        }

        warn!(status = %response.status(), "Yahoo rejected the crumb, refreshing");
        self.crumb.invalidate().await;
        let crumb = self.crumb().await?;
        Ok(build(&crumb).send().await?)
    }

    /// One `quoteSummary` module, `None` when Yahoo knows nothing of the ticker
    async fn quote_summary_module(&self, ticker: &str, module: &str) -> Result<Option<Value>> {
        let response = self
            .send_with_crumb(|crumb| {
                self.http
                    .get(format!("{QUOTE_SUMMARY_URL}/{ticker}"))
                    .query(&[("modules", module), ("crumb", crumb)])
            })
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(ticker, module, "Ticker not found");
            return Ok(None);
        }
        check_status(response.status())?;

        let envelope: QuoteSummaryEnvelope = response.json().await?;
        Ok(envelope.module(module))
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn check_status(status: StatusCode) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ResearchError::RateLimited {
            provider: PROVIDER.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ResearchError::Upstream(format!("{PROVIDER}: HTTP error {status}")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<Value>>,
}

impl QuoteSummaryEnvelope {
    fn module(self, module: &str) -> Option<Value> {
        self.quote_summary
            .result?
            .into_iter()
            .next()
            .and_then(|mut result| result.get_mut(module).map(Value::take))
    }
}

/// Yahoo's `{"raw": .., "fmt": ..}` number wrapper
#[derive(Debug, Default, Deserialize)]
struct RawNumber {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(number: Option<&RawNumber>) -> Option<f64> {
    number.and_then(|n| n.raw)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetSharePurchaseActivity {
    period: Option<String>,
    buy_info_shares: Option<RawNumber>,
    sell_info_shares: Option<RawNumber>,
    net_info_shares: Option<RawNumber>,
    net_percent_insider_shares: Option<RawNumber>,
    buy_percent_insider_shares: Option<RawNumber>,
    sell_percent_insider_shares: Option<RawNumber>,
    total_insider_shares: Option<RawNumber>,
}

/// Lay out the `netSharePurchaseActivity` module as a labelled table
fn insider_table_from(module: Value) -> Result<InsiderTable> {
    let activity: NetSharePurchaseActivity = serde_json::from_value(module)?;
    let header = activity
        .period
        .as_deref()
        .map(|period| format!("Insider Purchases Last {period}"))
        .unwrap_or_default();

    let rows = [
        (PURCHASES, &activity.buy_info_shares),
        (SALES, &activity.sell_info_shares),
        (NET_SHARES, &activity.net_info_shares),
        (TOTAL_HELD, &activity.total_insider_shares),
        (PERCENT_NET, &activity.net_percent_insider_shares),
        (PERCENT_BUY, &activity.buy_percent_insider_shares),
        (PERCENT_SELL, &activity.sell_percent_insider_shares),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_some())
    .map(|(label, value)| InsiderRow {
        label: label.to_string(),
        shares: raw(value.as_ref()),
    })
    .collect();

    Ok(InsiderTable { header, rows })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstitutionOwnership {
    #[serde(default)]
    ownership_list: Vec<OwnershipEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnershipEntry {
    organization: Option<String>,
    pct_held: Option<RawNumber>,
    pct_change: Option<RawNumber>,
    report_date: Option<RawNumber>,
}

/// Holders from the `institutionOwnership` module; entries without a name or
/// stake are skipped
fn holder_table_from(module: Value) -> Result<HolderTable> {
    let ownership: InstitutionOwnership = serde_json::from_value(module)?;
    let rows = ownership
        .ownership_list
        .into_iter()
        .filter_map(|entry| {
            Some(HolderRow {
                holder: entry.organization?,
                pct_held: raw(entry.pct_held.as_ref())?,
                pct_change: raw(entry.pct_change.as_ref()),
                date_reported: raw(entry.report_date.as_ref())
                    .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
                    .map(|dt| dt.date_naive()),
            })
        })
        .collect();
    Ok(HolderTable { rows })
}

/// Readable label for a time-series type: `quarterlyDilutedEPS` becomes
/// `Diluted EPS`
pub fn humanize_type(type_name: &str) -> String {
    let name = type_name.strip_prefix("quarterly").unwrap_or(type_name);
    let chars: Vec<char> = name.chars().collect();
    let mut label = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev_lower = chars[i - 1].is_ascii_lowercase();
            let acronym_end = chars[i - 1].is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev_lower || acronym_end {
                label.push(' ');
            }
        }
        label.push(c);
    }
    label
}

/// Rows of the fundamentals time-series response, in request order
fn income_statement_from(body: &Value) -> IncomeStatement {
    let results = body["timeseries"]["result"].as_array();
    let mut rows = Vec::new();

    for &type_name in INCOME_TYPES {
        let Some(result) = results
            .into_iter()
            .flatten()
            .find(|r| r["meta"]["type"][0].as_str() == Some(type_name))
        else {
            continue;
        };

        let values: Vec<(NaiveDate, Option<f64>)> = result[type_name]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let date = entry["asOfDate"]
                    .as_str()
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())?;
                Some((date, entry["reportedValue"]["raw"].as_f64()))
            })
            .collect();

        if !values.is_empty() {
            rows.push(StatementRow {
                label: humanize_type(type_name),
                values,
            });
        }
    }

    IncomeStatement { rows }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn price_history(&self, ticker: &str) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| ResearchError::Upstream(format!("{PROVIDER}: {e}")))?;

        let response = provider
            .get_quote_range(ticker, "1d", &self.price_range)
            .await
            .map_err(|e| ResearchError::Upstream(format!("{PROVIDER}: {e}")))?;

        // Yahoo answers unknown or delisted tickers with an empty quote list
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!(ticker, error = %e, "No quotes in response");
                Vec::new()
            }
        };

        let points = quotes
            .iter()
            .filter_map(|q| {
                let ts = i64::try_from(q.timestamp).ok()?;
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(PricePoint {
                    date,
                    close: q.close,
                })
            })
            .collect();

        let series = PriceSeries::new(points);
        debug!(ticker, points = series.len(), "Fetched price history");
        Ok(series)
    }

    #[instrument(skip(self))]
    async fn quarterly_income_statement(&self, ticker: &str) -> Result<IncomeStatement> {
        let now = Utc::now();
        let start = now
            .checked_sub_months(Months::new(STATEMENT_HISTORY_MONTHS))
            .unwrap_or(now);
        let types = INCOME_TYPES.join(",");
        let period1 = start.timestamp().to_string();
        let period2 = now.timestamp().to_string();

        let response = self
            .send_with_crumb(|crumb| {
                self.http.get(format!("{TIMESERIES_URL}/{ticker}")).query(&[
                    ("symbol", ticker),
                    ("type", types.as_str()),
                    ("period1", period1.as_str()),
                    ("period2", period2.as_str()),
                    ("crumb", crumb),
                ])
            })
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(IncomeStatement::default());
        }
        check_status(response.status())?;

        let body: Value = response.json().await?;
        let statement = income_statement_from(&body);
        debug!(ticker, rows = statement.rows.len(), "Fetched income statement");
        Ok(statement)
    }

    #[instrument(skip(self))]
    async fn insider_purchases(&self, ticker: &str) -> Result<InsiderTable> {
        match self
            .quote_summary_module(ticker, "netSharePurchaseActivity")
            .await?
        {
            Some(module) => insider_table_from(module),
            None => Ok(InsiderTable::default()),
        }
    }

    #[instrument(skip(self))]
    async fn institutional_holders(&self, ticker: &str) -> Result<HolderTable> {
        match self
            .quote_summary_module(ticker, "institutionOwnership")
            .await?
        {
            Some(module) => holder_table_from(module),
            None => Ok(HolderTable::default()),
        }
    }
}
