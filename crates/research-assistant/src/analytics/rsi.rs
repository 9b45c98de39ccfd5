//! Relative Strength Index over a daily close series
//!
//! Gains and losses are smoothed with an exponential moving average
//! (α = 2 / (period + 1), seeded with the first value, no bias correction).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

use super::{mean, round_to};
use crate::error::{Result, ResearchError};

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronological close series with unique dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date. For duplicate dates the last point wins.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut unique: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match unique.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => unique.push(point),
            }
        }
        Self { points: unique }
    }

    /// Consecutive daily closes starting at `start`
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let points = start
            .iter_days()
            .zip(closes)
            .map(|(date, &close)| PricePoint { date, close })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Signal band of an RSI reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiSignal {
    /// Classify a reading; an undefined reading is neutral
    pub fn classify(rsi: Option<f64>) -> Self {
        match rsi {
            Some(v) if v > 70.0 => Self::Overbought,
            Some(v) if v < 30.0 => Self::Oversold,
            _ => Self::Neutral,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Overbought => "OVERBOUGHT (RSI > 70) - Potential sell signal",
            Self::Oversold => "OVERSOLD (RSI < 30) - Potential buy signal",
            Self::Neutral => "NEUTRAL (30 < RSI < 70) - No strong signal",
        }
    }
}

/// RSI summary for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiSummary {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Reported_Date")]
    pub reported_date: NaiveDate,
    #[serde(rename = "Latest_RSI")]
    pub latest: Option<f64>,
    #[serde(rename = "Signal")]
    pub signal: String,
    #[serde(rename = "Classification")]
    pub classification: RsiSignal,
    #[serde(rename = "Max_RSI")]
    pub max: Option<f64>,
    #[serde(rename = "Min_RSI")]
    pub min: Option<f64>,
    #[serde(rename = "Average_RSI")]
    pub average: Option<f64>,
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss > 0.0 {
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    } else if avg_gain > 0.0 {
        Some(100.0)
    } else {
        None
    }
}

/// RSI reading for every close.
///
/// The first close has no change and counts as a zero move. A NaN or
/// infinite close contributes a zero move on both sides of it. A reading is
/// undefined when both smoothed averages are zero.
pub fn compute_rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(ResearchError::Indicator("RSI period must be greater than 0".to_string()));
    }
    let mut gain_ema = ExponentialMovingAverage::new(period)
        .map_err(|e| ResearchError::Indicator(e.to_string()))?;
    let mut loss_ema = ExponentialMovingAverage::new(period)
        .map_err(|e| ResearchError::Indicator(e.to_string()))?;

    let mut previous: Option<f64> = None;
    let readings = closes
        .iter()
        .map(|&close| {
            let change = previous.map_or(0.0, |prev| close - prev);
            let change = if change.is_finite() { change } else { 0.0 };
            previous = Some(close);

            let avg_gain = gain_ema.next(change.max(0.0));
            let avg_loss = loss_ema.next((-change).max(0.0));
            rsi_from_averages(avg_gain, avg_loss)
        })
        .collect();

    Ok(readings)
}

/// Compute RSI over `prices` and summarize the latest reading
pub fn summarize_rsi(ticker: &str, prices: &PriceSeries, period: usize) -> Result<RsiSummary> {
    let Some(latest_point) = prices.latest() else {
        return Err(ResearchError::NoData(format!(
            "No data available for ticker '{ticker}'"
        )));
    };

    let readings = compute_rsi(&prices.closes(), period)?;
    let latest = readings.last().copied().flatten();
    let defined: Vec<f64> = readings.iter().flatten().copied().collect();
    let classification = RsiSignal::classify(latest);

    Ok(RsiSummary {
        ticker: ticker.to_string(),
        reported_date: latest_point.date,
        latest: latest.map(|v| round_to(v, 2)),
        signal: classification.description().to_string(),
        classification,
        max: defined.iter().copied().reduce(f64::max).map(|v| round_to(v, 2)),
        min: defined.iter().copied().reduce(f64::min).map(|v| round_to(v, 2)),
        average: mean(&defined).map(|v| round_to(v, 2)),
    })
}
