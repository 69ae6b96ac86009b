use anyhow::{Context, Result};
use serde::Serialize;

use crate::research::analysis::formatting::{format_currency, format_multiple, format_number, format_percent};
use crate::research::analysis::price_history::PriceSummary;
use crate::research::analysis::ratios::RatioSet;
use crate::research::analysis::sensitivity::SensitivityLabel;
use crate::research::data::models::CompanyProfile;
use crate::research::llm::model_provider::{ChatMessage, LLMModelConfig};
use crate::research::llm::models::ConfiguredModel;

pub const AI_SUMMARY_FALLBACK: &str = "Error generating AI summary.";

const SYSTEM_PROMPT: &str = "You are a financial analyst assistant specializing in company research. \
Write concise, professional summaries grounded only in the data you are given.";

/// Everything a summary may mention for one company.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeInput<'a> {
  pub profile: &'a CompanyProfile,
  pub ratios: &'a RatioSet,
  pub sensitivity: SensitivityLabel,
  pub legal_summary: Option<&'a str>,
  pub price_summary: Option<&'a PriceSummary>,
}

/// One sentence per available metric; missing metrics are left out entirely.
pub fn compose_template(input: &NarrativeInput) -> String {
  let profile = input.profile;
  let ratios = input.ratios;
  let name: &str = profile.display_name();
  let mut sentences: Vec<String> = Vec::new();

  match (profile.sector.as_deref(), profile.industry.as_deref()) {
    (Some(sector), Some(industry)) => sentences.push(format!("{} operates in the {} sector ({}).", name, sector, industry)),
    (Some(sector), None) => sentences.push(format!("{} operates in the {} sector.", name, sector)),
    _ => {}
  }
  if profile.market_cap.is_some() {
    sentences.push(format!("Its market capitalisation is {}.", format_currency(profile.market_cap)));
  }
  if profile.pe_ratio.is_some() {
    sentences.push(format!("The shares trade at {} times trailing earnings.", format_number(profile.pe_ratio)));
  }
  if let Some(price) = input.price_summary {
    let change: String = price.period_return.map(|r| format!(", a change of {} over the period", format_percent(Some(r)))).unwrap_or_default();
    sentences.push(format!("The latest close was {}{}.", format_currency(Some(price.latest_close)), change));
  }
  if ratios.revenue_growth.is_some() {
    sentences.push(format!("Revenue changed {} year over year.", format_percent(ratios.revenue_growth)));
  }
  if ratios.cagr.is_some() {
    sentences.push(format!("Revenue compounded at {} per year across the reported periods.", format_percent(ratios.cagr)));
  }
  if ratios.net_profit_margin.is_some() {
    sentences.push(format!("The net profit margin is {}.", format_percent(ratios.net_profit_margin)));
  }
  if ratios.return_on_assets.is_some() {
    sentences.push(format!("Return on assets stands at {}.", format_percent(ratios.return_on_assets)));
  }
  if ratios.rd_spend_pct.is_some() {
    sentences.push(format!("R&D spending amounts to {} of revenue.", format_percent(ratios.rd_spend_pct)));
  }
  if ratios.asset_turnover.is_some() {
    sentences.push(format!("Asset turnover is {}.", format_multiple(ratios.asset_turnover)));
  }
  if ratios.free_cash_flow.is_some() {
    sentences.push(format!("Free cash flow was {}.", format_currency(ratios.free_cash_flow)));
  }
  if ratios.financial_leverage.is_some() {
    sentences.push(format!("Assets are {} shareholders' equity.", format_multiple(ratios.financial_leverage)));
  }
  if ratios.debt_to_assets.is_some() {
    sentences.push(format!("Debt makes up {} of total assets.", format_percent(ratios.debt_to_assets)));
  }
  if ratios.net_debt.is_some() {
    sentences.push(format!("Net debt is {}.", format_currency(ratios.net_debt)));
  }
  if ratios.interest_coverage.is_some() {
    sentences.push(format!("Operating earnings cover interest expense {}.", format_multiple(ratios.interest_coverage)));
  }
  if ratios.debt_service_coverage.is_some() {
    sentences.push(format!("Operating cash flow covers interest {}.", format_multiple(ratios.debt_service_coverage)));
  }
  if ratios.free_cash_flow_to_debt.is_some() {
    sentences.push(format!("Free cash flow to total debt is {}.", format_multiple(ratios.free_cash_flow_to_debt)));
  }
  sentences.push(format!("Interest-rate sensitivity is assessed as {}.", input.sensitivity));

  sentences.join(" ")
}

pub fn build_prompt(input: &NarrativeInput) -> Result<Vec<ChatMessage>> {
  let record: String = serde_json::to_string_pretty(input).context("Failed to serialize report data for LLM prompt")?;
  let legal: &str = input.legal_summary.unwrap_or("No registry lookup was requested.");

  let human_prompt: String = format!(r#"Provide a concise and professional summary for the following company, focusing on financial health and key information from its registry filings.

Company: {} ({})

Structured data (null means unavailable):
{}

Legal filings:
{}

Instructions: Summarize the financial health of the company and highlight any legal filings, discussing potential impacts on operations, revenue and profit."#,
    input.profile.display_name(), input.profile.ticker, record, legal);

  Ok(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(&human_prompt)])
}

pub struct NarrativeComposer {
  model: Option<ConfiguredModel>,
}

impl NarrativeComposer {
  pub fn new(model: Option<ConfiguredModel>) -> Self {
    NarrativeComposer { model }
  }

  pub fn uses_llm(&self) -> bool {
    self.model.is_some()
  }

  /// The LLM summary when a model is configured, otherwise the template narrative.
  pub async fn compose(&self, input: &NarrativeInput<'_>) -> String {
    let model: &ConfiguredModel = match &self.model {
      Some(model) => model,
      None => return compose_template(input),
    };

    let messages: Vec<ChatMessage> = match build_prompt(input) {
      Ok(messages) => messages,
      Err(e) => {
        log::error!("Could not build summary prompt for {}: {:#}", input.profile.ticker, e);
        return AI_SUMMARY_FALLBACK.to_string();
      }
    };
    let call_config: LLMModelConfig = model.config.clone().with_sampling(0.5, 500);

    log::info!("({}) Calling {} for the report summary", input.profile.ticker, call_config.provider);
    match model.chatter.chat(messages, &call_config).await {
      Ok(response) if !response.content.trim().is_empty() => response.content.trim().to_string(),
      Ok(_) => {
        log::error!("({}) LLM returned an empty summary", input.profile.ticker);
        AI_SUMMARY_FALLBACK.to_string()
      },
      Err(e) => {
        log::error!("({}) Error generating AI summary: {:#}", input.profile.ticker, e);
        AI_SUMMARY_FALLBACK.to_string()
      }
    }
  }
}
