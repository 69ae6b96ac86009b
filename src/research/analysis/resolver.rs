use async_trait::async_trait;

use crate::research::llm::model_provider::{ChatMessage, LLMModelConfig};
use crate::research::llm::models::ConfiguredModel;

const MAX_TICKER_LEN: usize = 10;

/// Name → ticker lookup. `None` means the name could not be resolved.
#[async_trait]
pub trait TickerResolver : Send + Sync {
  async fn resolve(&self, company_name: &str) -> Option<String>;
}

/// True for inputs such as `AAPL`, `BRK.B` or `RDS-A`.
pub fn looks_like_ticker(candidate: &str) -> bool {
  let candidate: &str = candidate.trim();
  !candidate.is_empty()
    && candidate.len() <= 6
    && candidate.chars().next().map_or(false, |c| c.is_ascii_uppercase())
    && candidate.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

/// Extracts a ticker from a model answer, rejecting anything that is not a bare symbol.
pub fn parse_ticker_answer(answer: &str) -> Option<String> {
  let cleaned: String = answer.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '`').to_uppercase();
  let cleaned: &str = cleaned.trim_end_matches('.');

  if cleaned.is_empty() || cleaned == "UNKNOWN" || cleaned.len() > MAX_TICKER_LEN || cleaned.chars().any(char::is_whitespace) {
    return None;
  }
  if !cleaned.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
    return None;
  }
  Some(cleaned.to_string())
}

/// Accepts names that already are tickers and nothing else.
pub struct PassthroughResolver;

#[async_trait]
impl TickerResolver for PassthroughResolver {
  async fn resolve(&self, company_name: &str) -> Option<String> {
    let candidate: &str = company_name.trim();
    if looks_like_ticker(candidate) { Some(candidate.to_string()) } else { None }
  }
}

pub struct LlmTickerResolver {
  model: ConfiguredModel,
}

impl LlmTickerResolver {
  pub fn new(model: ConfiguredModel) -> Self {
    LlmTickerResolver { model }
  }
}

#[async_trait]
impl TickerResolver for LlmTickerResolver {
  async fn resolve(&self, company_name: &str) -> Option<String> {
    let company_name: &str = company_name.trim();
    if looks_like_ticker(company_name) {
      return Some(company_name.to_string());
    }

    let messages: Vec<ChatMessage> = vec![
      ChatMessage::system("You map company names to their primary stock exchange ticker symbol. Reply with the ticker symbol only, or UNKNOWN."),
      ChatMessage::user(&format!("What is the stock ticker symbol for {}?", company_name)),
    ];
    let call_config: LLMModelConfig = self.model.config.clone().with_sampling(0.0, 10);

    match self.model.chatter.chat(messages, &call_config).await {
      Ok(response) => {
        let ticker: Option<String> = parse_ticker_answer(&response.content);
        log::info!("Resolved company name {:?} to {:?}", company_name, ticker);
        ticker
      },
      Err(e) => {
        log::error!("Ticker resolution for {:?} failed: {:#}", company_name, e);
        None
      }
    }
  }
}
