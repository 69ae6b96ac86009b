use crate::research::data::models::{
    CompanyFactsResponse, CompanyProfile, FinancialMetrics, FinancialMetricsResponse,
    FinancialStatement, FinancialStatements, Price, PriceResponse, StatementPeriod,
};
use crate::research::data::data::{FinancialHeaderData, StatementKind};
use crate::app::config::Config;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use reqwest::header::HeaderMap;
use serde_json::Value;


/// Market data the report needs for one ticker.
#[async_trait]
pub trait MarketDataProvider : Send + Sync {
  async fn get_company_profile(&self, ticker: &str) -> Result<CompanyProfile>;

  async fn get_financial_statements(&self, ticker: &str) -> Result<FinancialStatements>;

  async fn get_prices(&self, ticker: &str, start_date: &str, end_date: &str) -> Result<Vec<Price>>;
}

pub struct MarketDataApi {
  base_url : String,
  api_key : Option<String>,
  statement_period : &'static str,
  statement_limit : i64,
  client : Client,
}

impl MarketDataApi {
  pub fn new(config: &Config) -> Self {
    MarketDataApi::with_base_url(&config.financial_datasets_url, config.financial_datasets_api_key.clone())
  }

  pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Self {
    MarketDataApi {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key,
      statement_period: "annual",
      statement_limit: 5,
      client: Client::new(),
    }
  }

  fn headers(&self) -> HeaderMap {
    FinancialHeaderData::new(self.api_key.clone()).to_header_map()
  }

  async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
    let url: String = format!("{}{}", self.base_url, path);
    log::debug!("Market data request: {} {:?}", url, query);

    let response: Response = self.client.get(&url).headers(self.headers()).query(query).send().await
      .with_context(|| format!("Request to {} failed", url))?;
    return Ok(response);
  }

  pub async fn get_company_facts(&self, ticker: &str) -> Result<Option<CompanyFactsResponse>> {
    let response: Response = self.get("/company/facts/", &[("ticker", ticker.to_string())]).await?;

    if response.status().is_success() {
      let facts: CompanyFactsResponse = response.json().await.context("Malformed company facts response")?;
      return Ok(Some(facts));
    }
    else if response.status() == StatusCode::NOT_FOUND {
      log::info!("No company facts for ticker {}", ticker);
      return Ok(None);
    }
    else {
      log::error!("Error fetching company facts for {}: {}", ticker, response.status());
      return Err(anyhow!("Company facts request for {} failed with status {}", ticker, response.status()));
    }
  }

  pub async fn get_financial_metrics(&self, ticker: &str, period: Option<&str>, limit: Option<i64>) -> Result<Vec<FinancialMetrics>> {
    let period: &str = period.unwrap_or("ttm");
    let limit : i64 = limit.unwrap_or(1);

    let query = [("ticker", ticker.to_string()), ("period", period.to_string()), ("limit", limit.to_string())];
    let response: Response = self.get("/financial-metrics/", &query).await?;

    if response.status().is_success() {
      let metric_response : FinancialMetricsResponse = response.json().await.context("Malformed financial metrics response")?;
      return Ok(metric_response.financial_metrics);
    }
    else {
      log::error!("Error getting financial metrics for {}: {}", ticker, response.status());
      return Err(anyhow!("Financial metrics request for {} failed with status {}", ticker, response.status()));
    }
  }

  pub async fn get_statement(&self, ticker: &str, kind: StatementKind) -> Result<FinancialStatement> {
    let query = [
      ("ticker", ticker.to_string()),
      ("period", self.statement_period.to_string()),
      ("limit", self.statement_limit.to_string()),
    ];
    let response: Response = self.get(kind.path(), &query).await?;

    if !response.status().is_success() {
      log::error!("Error getting {} for {}: {}", kind, ticker, response.status());
      return Err(anyhow!("{} request for {} failed with status {}", kind, ticker, response.status()));
    }

    let mut body: Value = response.json().await.with_context(|| format!("Malformed {} response", kind))?;
    let periods: Vec<StatementPeriod> = match body.get_mut(kind.response_key()) {
      Some(rows) => serde_json::from_value(rows.take()).with_context(|| format!("Malformed {} rows", kind))?,
      None => {
        log::warn!("{} response for {} has no {} key", kind, ticker, kind.response_key());
        Vec::new()
      }
    };

    return Ok(FinancialStatement::new(periods));
  }
}

#[async_trait]
impl MarketDataProvider for MarketDataApi {
  async fn get_company_profile(&self, ticker: &str) -> Result<CompanyProfile> {
    let facts: CompanyFactsResponse = self.get_company_facts(ticker).await?
      .ok_or_else(|| anyhow!("No company found for ticker {}", ticker))?;

    // Without metrics the profile keeps only the company facts.
    let metrics: Vec<FinancialMetrics> = match self.get_financial_metrics(ticker, Some("ttm"), Some(1)).await {
      Ok(metrics) => metrics,
      Err(e) => {
        log::warn!("Continuing without financial metrics for {}: {:#}", ticker, e);
        Vec::new()
      }
    };

    return Ok(CompanyProfile::from_provider(facts.company_facts, metrics.first()));
  }

  async fn get_financial_statements(&self, ticker: &str) -> Result<FinancialStatements> {
    let mut statements: FinancialStatements = FinancialStatements::default();

    for kind in [StatementKind::Income, StatementKind::Balance, StatementKind::CashFlow] {
      log::info!("Fetching {} for {}", kind, ticker);
      let statement: FinancialStatement = match self.get_statement(ticker, kind).await {
        Ok(statement) => statement,
        Err(e) => {
          // Ratios depending on this statement come out unavailable.
          log::warn!("Skipping {} for {}: {:#}", kind, ticker, e);
          FinancialStatement::default()
        }
      };

      match kind {
        StatementKind::Income => statements.income = statement,
        StatementKind::Balance => statements.balance = statement,
        StatementKind::CashFlow => statements.cash_flow = statement,
      }
    }

    return Ok(statements);
  }

  async fn get_prices(&self, ticker: &str, start_date: &str, end_date: &str) -> Result<Vec<Price>> {
    let query = [
      ("ticker", ticker.to_string()),
      ("interval", "day".to_string()),
      ("interval_multiplier", "1".to_string()),
      ("start_date", start_date.to_string()),
      ("end_date", end_date.to_string()),
    ];
    let response: Response = self.get("/prices/", &query).await?;

    if response.status().is_success() {
      let price_response: PriceResponse = response.json().await.context("Malformed price response")?;
      return Ok(price_response.prices);
    }
    else {
      log::error!("Error getting prices for {}: {}", ticker, response.status());
      return Err(anyhow!("Price request for {} failed with status {}", ticker, response.status()));
    }
  }
}
