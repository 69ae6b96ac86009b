use std::sync::Arc;
use chrono::Local;
use serde::{Serialize, Deserialize};

use crate::app::error::ReportError;
use crate::research::analysis::evaluation::evaluate_stock;
use crate::research::analysis::narrative::{NarrativeComposer, NarrativeInput};
use crate::research::analysis::peers::{sector_averages, PeerDiscovery, SectorAverages};
use crate::research::analysis::price_history::{price_window, summarize, PriceSummary};
use crate::research::analysis::ratios::RatioSet;
use crate::research::analysis::resolver::TickerResolver;
use crate::research::analysis::sensitivity::{classify, SensitivityLabel};
use crate::research::data::models::{CompanyProfile, FinancialStatements};
use crate::research::tools::api::MarketDataProvider;
use crate::research::tools::registry::{RegistryClient, LEGAL_FILINGS_HEADING};

fn non_blank(value: &str) -> Option<&str> {
  Some(value.trim()).filter(|v| !v.is_empty())
}

/// The report form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
  #[serde(default)]
  pub ticker: String,
  #[serde(default)]
  pub company_name: String,
  #[serde(default)]
  pub company_number: String,
}

impl ReportRequest {
  pub fn ticker(&self) -> Option<String> {
    non_blank(&self.ticker).map(str::to_uppercase)
  }

  pub fn company_name(&self) -> Option<&str> {
    non_blank(&self.company_name)
  }

  pub fn company_number(&self) -> Option<&str> {
    non_blank(&self.company_number)
  }

  pub fn validate(&self) -> Result<(), ReportError> {
    if self.ticker().is_none() && self.company_name().is_none() {
      return Err(ReportError::MissingInput);
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
  pub ticker: String,
  pub profile: CompanyProfile,
  pub ratios: RatioSet,
  pub sensitivity: SensitivityLabel,
  pub legal_summary: Option<String>,
  pub sector_averages: SectorAverages,
  pub price_summary: Option<PriceSummary>,
  pub summary: String,
  pub ai_generated: bool,
  pub generated_at: String,
}

pub struct ReportService {
  market: Arc<dyn MarketDataProvider>,
  registry: RegistryClient,
  narrative: NarrativeComposer,
  resolver: Arc<dyn TickerResolver>,
  peers: Arc<dyn PeerDiscovery>,
}

impl ReportService {

  pub fn new(market: Arc<dyn MarketDataProvider>, registry: RegistryClient, narrative: NarrativeComposer,
             resolver: Arc<dyn TickerResolver>, peers: Arc<dyn PeerDiscovery>) -> Self {
    ReportService { market, registry, narrative, resolver, peers }
  }

  async fn resolve_ticker(&self, request: &ReportRequest) -> Result<String, ReportError> {
    request.validate()?;

    if let Some(ticker) = request.ticker() {
      return Ok(ticker);
    }

    let company_name: &str = request.company_name().ok_or(ReportError::MissingInput)?;
    match self.resolver.resolve(company_name).await {
      Some(ticker) => Ok(ticker),
      None => Err(ReportError::TickerNotResolved(company_name.to_string())),
    }
  }

  async fn fetch_profile(&self, ticker: &str) -> Result<CompanyProfile, ReportError> {
    match self.market.get_company_profile(ticker).await {
      Ok(profile) if profile.name.is_some() => Ok(profile),
      Ok(_) => {
        log::error!("Provider returned no company name for {}", ticker);
        Err(ReportError::DataUnavailable(ticker.to_string()))
      },
      Err(e) => {
        log::error!("Error retrieving financial data for {}: {:#}", ticker, e);
        Err(ReportError::DataUnavailable(ticker.to_string()))
      }
    }
  }

  pub async fn build_report(&self, request: &ReportRequest) -> Result<CompanyReport, ReportError> {
    let ticker: String = self.resolve_ticker(request).await?;
    log::info!("Building report for {} (company number: {:?})", ticker, request.company_number());

    let profile: CompanyProfile = self.fetch_profile(&ticker).await?;

    let statements: FinancialStatements = match self.market.get_financial_statements(&ticker).await {
      Ok(statements) => statements,
      Err(e) => {
        log::warn!("Continuing without statements for {}: {:#}", ticker, e);
        FinancialStatements::default()
      }
    };

    let (start_date, end_date) = price_window(Local::now().date_naive());
    let price_summary: Option<PriceSummary> = match self.market.get_prices(&ticker, &start_date, &end_date).await.and_then(|prices| summarize(&prices)) {
      Ok(summary) => summary,
      Err(e) => {
        log::warn!("Continuing without price history for {}: {:#}", ticker, e);
        None
      }
    };

    let ratios: RatioSet = RatioSet::compute(&statements);
    log::info!("{}: {} of {} ratios available", ticker, ratios.available_count(), ratios.entries().len());

    let sensitivity: SensitivityLabel = classify(profile.sector.as_deref(), profile.debt_to_equity);

    let legal_summary: Option<String> = match request.company_number() {
      Some(company_number) => {
        let filings: String = self.registry.retrieve_legal_summary(company_number).await;
        Some(format!("{}\n{}", LEGAL_FILINGS_HEADING, filings))
      },
      None => None,
    };

    let sector_averages: SectorAverages = sector_averages(self.market.as_ref(), self.peers.as_ref(), profile.sector.as_deref()).await;

    let input: NarrativeInput = NarrativeInput {
      profile: &profile,
      ratios: &ratios,
      sensitivity,
      legal_summary: legal_summary.as_deref(),
      price_summary: price_summary.as_ref(),
    };
    let summary: String = self.narrative.compose(&input).await;

    return Ok(CompanyReport {
      ticker,
      profile,
      ratios,
      sensitivity,
      legal_summary,
      sector_averages,
      price_summary,
      summary,
      ai_generated: self.narrative.uses_llm(),
      generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
    });
  }

  /// Long-term checklist for a company name or ticker.
  pub async fn evaluate(&self, company_name: &str) -> Result<Vec<String>, ReportError> {
    let request: ReportRequest = ReportRequest { company_name: company_name.to_string(), ..ReportRequest::default() };
    let ticker: String = self.resolve_ticker(&request).await?;
    let profile: CompanyProfile = self.fetch_profile(&ticker).await?;
    Ok(evaluate_stock(&profile))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::research::analysis::narrative::compose_template;
  use crate::research::analysis::peers::StaticPeerDirectory;
  use crate::research::analysis::resolver::PassthroughResolver;
  use crate::research::data::models::{FinancialStatement, Price, StatementPeriod};
  use crate::research::tools::registry::REGISTRY_UNAVAILABLE;
  use anyhow::{anyhow, Result};
  use async_trait::async_trait;
  use serde_json::Value;
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use wiremock::matchers::method;
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[derive(Default)]
  struct FakeMarket {
    calls: AtomicUsize,
  }

  #[async_trait]
  impl MarketDataProvider for FakeMarket {
    async fn get_company_profile(&self, ticker: &str) -> Result<CompanyProfile> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match ticker {
        "ACME" => Ok(CompanyProfile {
          ticker: "ACME".to_string(),
          name: Some("Acme Corp".to_string()),
          sector: Some("Real Estate".to_string()),
          pe_ratio: Some(12.0),
          return_on_equity: Some(0.2),
          debt_to_equity: Some(1.5),
          ..CompanyProfile::default()
        }),
        "NONAME" => Ok(CompanyProfile { ticker: "NONAME".to_string(), ..CompanyProfile::default() }),
        _ => Err(anyhow!("unknown ticker {}", ticker)),
      }
    }

    async fn get_financial_statements(&self, _ticker: &str) -> Result<FinancialStatements> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let period = StatementPeriod {
        report_period: "2023-12-31".to_string(),
        extra: HashMap::from([
          ("revenue".to_string(), Value::from(1000.0)),
          ("net_income".to_string(), Value::from(50.0)),
        ]),
        ..StatementPeriod::default()
      };
      Ok(FinancialStatements { income: FinancialStatement::new(vec![period]), ..FinancialStatements::default() })
    }

    async fn get_prices(&self, _ticker: &str, _start: &str, _end: &str) -> Result<Vec<Price>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Err(anyhow!("prices offline"))
    }
  }

  fn service(market: Arc<FakeMarket>, registry_url: &str) -> ReportService {
    ReportService::new(
      market,
      RegistryClient::with_base_url(registry_url, "key"),
      NarrativeComposer::new(None),
      Arc::new(PassthroughResolver),
      Arc::new(StaticPeerDirectory::default()),
    )
  }

  fn request(ticker: &str, company_name: &str, company_number: &str) -> ReportRequest {
    ReportRequest { ticker: ticker.to_string(), company_name: company_name.to_string(), company_number: company_number.to_string() }
  }

  #[tokio::test]
  async fn blank_request_never_reaches_the_provider() {
    let market = Arc::new(FakeMarket::default());
    let service = service(market.clone(), "http://127.0.0.1:9");

    let result = service.build_report(&request("   ", "", "12345678")).await;

    assert_eq!(result.unwrap_err(), ReportError::MissingInput);
    assert_eq!(market.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn report_is_built_from_provider_data() {
    let market = Arc::new(FakeMarket::default());
    let service = service(market.clone(), "http://127.0.0.1:9");

    let report = service.build_report(&request(" acme ", "", "")).await.unwrap();

    assert_eq!(report.ticker, "ACME");
    assert_eq!(report.sensitivity, SensitivityLabel::VeryHigh);
    assert_eq!(report.ratios.net_profit_margin, Some(0.05));
    assert_eq!(report.price_summary, None);
    assert_eq!(report.legal_summary, None);
    assert_eq!(report.sector_averages.sector.as_deref(), Some("Real Estate"));
    assert!(!report.ai_generated);

    let input = NarrativeInput {
      profile: &report.profile, ratios: &report.ratios, sensitivity: report.sensitivity,
      legal_summary: None, price_summary: None,
    };
    assert_eq!(report.summary, compose_template(&input));
  }

  #[tokio::test]
  async fn registry_failure_is_reported_in_the_legal_section() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let market = Arc::new(FakeMarket::default());
    let service = service(market, &server.uri());

    let report = service.build_report(&request("ACME", "", "01234567")).await.unwrap();
    assert_eq!(report.legal_summary, Some(format!("{}\n{}", LEGAL_FILINGS_HEADING, REGISTRY_UNAVAILABLE)));
  }

  #[tokio::test]
  async fn provider_failures_become_data_unavailable() {
    let market = Arc::new(FakeMarket::default());
    let service = service(market, "http://127.0.0.1:9");

    assert_eq!(service.build_report(&request("ZZZZ", "", "")).await.unwrap_err(), ReportError::DataUnavailable("ZZZZ".to_string()));
    assert_eq!(service.build_report(&request("NONAME", "", "")).await.unwrap_err(), ReportError::DataUnavailable("NONAME".to_string()));
  }

  #[tokio::test]
  async fn company_name_goes_through_the_resolver() {
    let market = Arc::new(FakeMarket::default());
    let service = service(market, "http://127.0.0.1:9");

    let report = service.build_report(&request("", "ACME", "")).await.unwrap();
    assert_eq!(report.ticker, "ACME");

    let result = service.build_report(&request("", "Acme Corporation", "")).await;
    assert_eq!(result.unwrap_err(), ReportError::TickerNotResolved("Acme Corporation".to_string()));
  }

  #[tokio::test]
  async fn evaluation_uses_the_profile() {
    let market = Arc::new(FakeMarket::default());
    let service = service(market, "http://127.0.0.1:9");

    let lines = service.evaluate("ACME").await.unwrap();
    assert_eq!(lines[0], "Positive: The P/E ratio of 12.00 suggests the stock is fairly valued or undervalued.");
    assert_eq!(lines[2], "Interest Rate Sensitivity: Very High");

    assert_eq!(service.evaluate("  ").await.unwrap_err(), ReportError::MissingInput);
  }
}
