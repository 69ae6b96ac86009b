use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use serde_json::{Value};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
  pub open : f64,
  pub close : f64,
  pub high: f64,
  pub low: f64,
  pub volume : i64,
  pub time: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
  #[serde(default)]
  pub ticker: String,
  #[serde(default)]
  pub prices: Vec<Price>,
}

/// Subset of the provider's financial metrics that the report reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
  #[serde(default)]
  pub ticker: String,
  #[serde(default)]
  pub report_period: String,
  #[serde(default)]
  pub period: String,
  pub market_cap: Option<f64>,
  pub price_to_earnings_ratio: Option<f64>,
  pub price_to_book_ratio: Option<f64>,
  pub return_on_equity: Option<f64>,
  pub debt_to_equity: Option<f64>,
  pub earnings_per_share: Option<f64>,
  pub beta: Option<f64>,
  pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialMetricsResponse {
  #[serde(default)]
  pub financial_metrics: Vec<FinancialMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFacts {
  pub ticker: String,
  pub name: String,
  pub industry: Option<String>,
  pub sector: Option<String>,
  pub exchange: Option<String>,
  pub market_cap: Option<f64>,
  pub website_url: Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFactsResponse {
  pub company_facts: CompanyFacts,
}

/// Company profile assembled from the provider's facts and latest metrics.
/// Any field may be missing upstream; templates render those as "N/A".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
  pub ticker: String,
  pub name: Option<String>,
  pub summary: Option<String>,
  pub sector: Option<String>,
  pub industry: Option<String>,
  pub market_cap: Option<f64>,
  pub beta: Option<f64>,
  pub pe_ratio: Option<f64>,
  pub eps: Option<f64>,
  pub dividend_yield: Option<f64>,
  pub debt_to_equity: Option<f64>,
  pub return_on_equity: Option<f64>,
  pub price_to_book: Option<f64>,
}

impl CompanyProfile {
  pub fn from_provider(facts: CompanyFacts, latest: Option<&FinancialMetrics>) -> Self {
    CompanyProfile {
      ticker: facts.ticker,
      name: Some(facts.name).filter(|name| !name.trim().is_empty()),
      summary: facts.description.filter(|description| !description.trim().is_empty()),
      sector: facts.sector,
      industry: facts.industry,
      market_cap: facts.market_cap.or_else(|| latest.and_then(|m| m.market_cap)),
      beta: latest.and_then(|m| m.beta),
      pe_ratio: latest.and_then(|m| m.price_to_earnings_ratio),
      eps: latest.and_then(|m| m.earnings_per_share),
      dividend_yield: latest.and_then(|m| m.dividend_yield),
      debt_to_equity: latest.and_then(|m| m.debt_to_equity),
      return_on_equity: latest.and_then(|m| m.return_on_equity),
      price_to_book: latest.and_then(|m| m.price_to_book_ratio),
    }
  }

  pub fn display_name(&self) -> &str {
    self.name.as_deref().unwrap_or(&self.ticker)
  }
}

/// One reporting period of a statement. Line items are kept by name, the way
/// the provider returns them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementPeriod {
  #[serde(default)]
  pub ticker: String,
  pub report_period: String,
  #[serde(default)]
  pub period: String,
  #[serde(default)]
  pub currency: String,

  #[serde(flatten)]
  pub extra: HashMap<String, Value>,
}

impl StatementPeriod {
  pub fn item(&self, name: &str) -> Option<f64> {
    self.extra.get(name).and_then(Value::as_f64)
  }
}

/// Periods ordered most recent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatement {
  pub periods: Vec<StatementPeriod>,
}

impl FinancialStatement {
  pub fn new(mut periods: Vec<StatementPeriod>) -> Self {
    periods.sort_by(|a, b| b.report_period.cmp(&a.report_period));
    FinancialStatement { periods }
  }

  pub fn len(&self) -> usize {
    self.periods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.periods.is_empty()
  }

  pub fn latest(&self, item: &str) -> Option<f64> {
    self.periods.first().and_then(|p| p.item(item))
  }

  pub fn previous(&self, item: &str) -> Option<f64> {
    self.periods.get(1).and_then(|p| p.item(item))
  }

  pub fn earliest(&self, item: &str) -> Option<f64> {
    self.periods.last().and_then(|p| p.item(item))
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
  pub income: FinancialStatement,
  pub balance: FinancialStatement,
  pub cash_flow: FinancialStatement,
}
