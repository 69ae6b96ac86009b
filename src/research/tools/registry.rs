use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::{Serialize, Deserialize};

use crate::app::config::Config;

pub const REGISTRY_UNAVAILABLE: &str = "Unable to retrieve legal information from Companies House.";
pub const NO_LEGAL_FILINGS: &str = "No significant legal filings found.";
pub const LEGAL_FILINGS_HEADING: &str = "Companies House Legal Filings:";

const LEGAL_KEYWORDS: [&str; 3] = ["legal", "court", "settlement"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filing {
  #[serde(default)]
  pub description: String,
  pub category: Option<String>,
  pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingHistoryResponse {
  #[serde(default)]
  pub items: Vec<Filing>,
}

/// Companies House filing-history client.
pub struct RegistryClient {
  base_url : String,
  api_key : String,
  client : Client,
}

impl RegistryClient {
  pub fn new(config: &Config) -> Self {
    RegistryClient::with_base_url(&config.companies_house_url, &config.companies_house_api_key)
  }

  pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
    RegistryClient {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
      client: Client::new(),
    }
  }

  pub async fn get_filing_history(&self, company_number: &str) -> Result<Vec<Filing>> {
    let company_number: &str = company_number.trim();
    if !is_company_number(company_number) {
      return Err(anyhow!("Invalid company number {:?}", company_number));
    }

    let url: String = format!("{}/company/{}/filing-history", self.base_url, company_number);
    // The API key is the basic-auth user name, with an empty password.
    let response: Response = self.client.get(&url).basic_auth(&self.api_key, Some("")).send().await
      .with_context(|| format!("Request to {} failed", url))?;

    if !response.status().is_success() {
      return Err(anyhow!("Filing history for {} returned status {}", company_number, response.status()));
    }

    let history: FilingHistoryResponse = response.json().await.context("Malformed filing history response")?;
    return Ok(history.items);
  }

  /// Newline-joined legal filings, or one of the fixed messages.
  pub async fn retrieve_legal_summary(&self, company_number: &str) -> String {
    match self.get_filing_history(company_number).await {
      Ok(filings) => {
        let legal_issues: Vec<&str> = filter_legal_filings(&filings);
        log::info!("Company {}: {} filings, {} legal", company_number, filings.len(), legal_issues.len());
        if legal_issues.is_empty() {
          NO_LEGAL_FILINGS.to_string()
        }
        else {
          legal_issues.join("\n")
        }
      },
      Err(e) => {
        log::error!("Registry lookup for company {} failed: {:#}", company_number, e);
        REGISTRY_UNAVAILABLE.to_string()
      }
    }
  }
}

/// Registry numbers are short alphanumeric codes such as `01234567` or `SC123456`.
pub fn is_company_number(candidate: &str) -> bool {
  !candidate.is_empty() && candidate.len() <= 10 && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn filter_legal_filings(filings: &[Filing]) -> Vec<&str> {
  filings.iter()
    .map(|filing| filing.description.as_str())
    .filter(|description| {
      let lowered: String = description.to_lowercase();
      LEGAL_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    })
    .collect()
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serde_json::json;
  use wiremock::matchers::{header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn filing(description: &str) -> Filing {
    Filing { description: description.to_string(), ..Filing::default() }
  }

  #[test]
  fn keyword_filter_is_case_insensitive() {
    let filings = vec![
      filing("Confirmation statement made on 1 March"),
      filing("Order of COURT for reduction of capital"),
      filing("Legal charge registered"),
      filing("Accounts for a small company"),
      filing("Notice of settlement agreement"),
    ];

    assert_eq!(
      filter_legal_filings(&filings),
      vec!["Order of COURT for reduction of capital", "Legal charge registered", "Notice of settlement agreement"]
    );
  }

  #[tokio::test]
  async fn not_found_yields_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/company/00000000/filing-history"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let client = RegistryClient::with_base_url(&server.uri(), "key");
    assert_eq!(client.retrieve_legal_summary("00000000").await, REGISTRY_UNAVAILABLE);
  }

  #[tokio::test]
  async fn matching_filings_are_joined_with_newlines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/company/01234567/filing-history"))
      .and(header("authorization", "Basic a2V5Og=="))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [
          {"description": "court-order", "category": "miscellaneous"},
          {"description": "accounts-with-accounts-type-full"},
          {"description": "legal-charge-satisfied"}
        ]
      })))
      .mount(&server)
      .await;

    let client = RegistryClient::with_base_url(&server.uri(), "key");
    assert_eq!(client.retrieve_legal_summary("01234567").await, "court-order\nlegal-charge-satisfied");
  }

  #[tokio::test]
  async fn no_matches_reports_none_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/company/01234567/filing-history"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [{"description": "confirmation-statement"}, {}]
      })))
      .mount(&server)
      .await;

    let client = RegistryClient::with_base_url(&server.uri(), "key");
    assert_eq!(client.retrieve_legal_summary("01234567").await, NO_LEGAL_FILINGS);
  }

  #[test]
  fn company_numbers_must_be_alphanumeric() {
    assert!(is_company_number("01234567"));
    assert!(is_company_number("SC123456"));
    assert!(!is_company_number(""));
    assert!(!is_company_number("0123/officers"));
    assert!(!is_company_number("0123?items_per_page=1"));
    assert!(!is_company_number("0123#x"));
  }

  #[tokio::test]
  async fn malformed_company_number_never_reaches_the_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []}))).mount(&server).await;

    let client = RegistryClient::with_base_url(&server.uri(), "key");
    assert_eq!(client.retrieve_legal_summary("../../officers").await, REGISTRY_UNAVAILABLE);
    assert_eq!(client.retrieve_legal_summary("0123?q=1").await, REGISTRY_UNAVAILABLE);
    assert!(server.received_requests().await.unwrap().is_empty());
  }
}
