use anyhow::Result;
use chrono::{Duration, NaiveDate};
use polars::prelude::{DataFrame, NamedFrom, Series, SortMultipleOptions};
use serde::{Serialize, Deserialize};

use crate::research::data::models::Price;

/// Days of daily bars requested for the report.
pub const PRICE_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
  pub start_date: String,
  pub end_date: String,
  pub latest_close: f64,
  pub period_high: f64,
  pub period_low: f64,
  pub period_return: Option<f64>,
  pub observations: usize,
}

/// `(start, end)` as `YYYY-MM-DD`, ending on `end`.
pub fn price_window(end: NaiveDate) -> (String, String) {
  let start: NaiveDate = end - Duration::days(PRICE_WINDOW_DAYS);
  (start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string())
}

pub fn prices_to_df(prices: &[Price]) -> Result<DataFrame> {
  let opens:   Vec<f64>    = prices.iter().map(|p| p.open).collect();
  let closes:  Vec<f64>    = prices.iter().map(|p| p.close).collect();
  let highs:   Vec<f64>    = prices.iter().map(|p| p.high).collect();
  let lows:    Vec<f64>    = prices.iter().map(|p| p.low).collect();
  let volumes: Vec<i64>    = prices.iter().map(|p| p.volume).collect();
  let times:   Vec<String> = prices.iter().map(|p| p.time.clone()).collect();

  let df = DataFrame::new(vec![
    Series::new("open",   &opens),
    Series::new("close",  &closes),
    Series::new("high",   &highs),
    Series::new("low",    &lows),
    Series::new("volume", &volumes),
    Series::new("time",   &times),
  ])?;

  // ISO-8601 timestamps sort chronologically as strings.
  let df = df.sort(&["time"], SortMultipleOptions::default())?;
  Ok(df)
}

pub fn summarize(prices: &[Price]) -> Result<Option<PriceSummary>> {
  if prices.is_empty() {
    return Ok(None);
  }

  let df: DataFrame = prices_to_df(prices)?;
  let closes = df.column("close")?.f64()?;
  let highs = df.column("high")?.f64()?;
  let lows = df.column("low")?.f64()?;
  let times = df.column("time")?.str()?;

  let observations: usize = df.height();
  let first_close: Option<f64> = closes.get(0);
  let latest_close: Option<f64> = closes.get(observations - 1);

  let period_high: Option<f64> = highs.into_iter().flatten().reduce(f64::max);
  let period_low: Option<f64> = lows.into_iter().flatten().reduce(f64::min);

  let (latest_close, period_high, period_low) = match (latest_close, period_high, period_low) {
    (Some(close), Some(high), Some(low)) => (close, high, low),
    _ => return Ok(None),
  };

  let period_return: Option<f64> = first_close
    .filter(|first| *first != 0.0)
    .map(|first| latest_close / first - 1.0);

  let date_of = |idx: usize| -> String {
    times.get(idx).map(|t| t.split('T').next().unwrap_or(t).to_string()).unwrap_or_default()
  };

  Ok(Some(PriceSummary {
    start_date: date_of(0),
    end_date: date_of(observations - 1),
    latest_close,
    period_high,
    period_low,
    period_return,
    observations,
  }))
}
