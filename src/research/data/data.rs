use reqwest::header::{HeaderValue, HeaderMap, CONTENT_TYPE, ACCEPT};
use serde;
use serde::{Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct FinancialHeaderData {
  #[serde(rename = "X-API-KEY")]
  pub api_key : Option<String>,
  pub content_type: String
}

impl FinancialHeaderData {
  pub fn new(api_key: Option<String>) -> Self {
    FinancialHeaderData { api_key: api_key, content_type: "application/json".to_string(), }
  }

  pub fn to_header_map(&self) -> HeaderMap {
    let mut headers: HeaderMap = HeaderMap::new();
    // The provider serves a free tier without a key.
    if let Some(api_key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
      if let Ok(value) = HeaderValue::from_str(api_key) {
        headers.insert("X-API-KEY", value);
      }
    }

    if let Ok(value) = HeaderValue::from_str(&self.content_type) {
      headers.insert(CONTENT_TYPE, value);
    }

    if let Ok(value) = HeaderValue::from_str("application/json") {
      headers.insert(ACCEPT, value);
    }

    return headers;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
  Income,
  Balance,
  CashFlow,
}

impl StatementKind {
  pub fn path(&self) -> &'static str {
    match self {
      StatementKind::Income => "/financials/income-statements/",
      StatementKind::Balance => "/financials/balance-sheets/",
      StatementKind::CashFlow => "/financials/cash-flow-statements/",
    }
  }

  /// Top-level JSON key holding the periods in the provider's response.
  pub fn response_key(&self) -> &'static str {
    match self {
      StatementKind::Income => "income_statements",
      StatementKind::Balance => "balance_sheets",
      StatementKind::CashFlow => "cash_flow_statements",
    }
  }
}

impl std::fmt::Display for StatementKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StatementKind::Income => write!(f, "income statement"),
      StatementKind::Balance => write!(f, "balance sheet"),
      StatementKind::CashFlow => write!(f, "cash-flow statement"),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_map_skips_empty_api_key() {
    let headers = FinancialHeaderData::new(Some(String::new())).to_header_map();
    assert!(headers.get("X-API-KEY").is_none());
    assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");

    let headers = FinancialHeaderData::new(Some("secret".to_string())).to_header_map();
    assert_eq!(headers.get("X-API-KEY").unwrap(), "secret");
  }
}
