use std::env;

use log;

pub const DEFAULT_FINANCIAL_DATASETS_URL: &str = "https://api.financialdatasets.ai";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPANIES_HOUSE_URL: &str = "https://api.company-information.service.gov.uk";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PORT: u16 = 5002;

#[derive(Clone, Debug)]
pub struct Config {
  pub financial_datasets_api_key : Option<String>,
  pub financial_datasets_url : String,
  pub openai_api_key : Option<String>,
  pub openai_base_url : String,
  pub llm_provider : String,
  pub llm_model : String,
  pub companies_house_api_key : String,
  pub companies_house_url : String,
  pub bind_address : String,
  pub port : u16,
}

impl Config {

  pub fn load() -> Self {
    match dotenv::dotenv() {
      Ok(_) => log::info!("Loaded .env file"),
      Err(_) => log::warn!("No .env file found, reading the process environment only"),
    }

    Config::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Self where F: Fn(&str) -> Option<String> {
    let read = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

    let financial_datasets_api_key : Option<String> = read("FINANCIAL_DATASETS_API_KEY");
    if financial_datasets_api_key.is_none() {
      log::info!("FINANCIAL_DATASETS_API_KEY not set, market data requests go out without a key");
    }
    let financial_datasets_url : String = read("FINANCIAL_DATASETS_URL").unwrap_or_else(|| DEFAULT_FINANCIAL_DATASETS_URL.to_string());

    let openai_api_key : Option<String> = read("OPENAI_API_KEY");
    if openai_api_key.is_none() {
      log::warn!("OPENAI_API_KEY not set, summaries fall back to the template narrative");
    }
    let openai_base_url : String = read("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
    let llm_provider : String = read("LLM_PROVIDER").unwrap_or_else(|| "OpenAI".to_string());
    let llm_model : String = read("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());

    let companies_house_api_key : String = read("COMPANIES_HOUSE_API_KEY").unwrap_or_else(|| {
      log::warn!("COMPANIES_HOUSE_API_KEY not set, registry lookups will be rejected");
      String::new()
    });
    let companies_house_url : String = read("COMPANIES_HOUSE_URL").unwrap_or_else(|| DEFAULT_COMPANIES_HOUSE_URL.to_string());

    let bind_address : String = read("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string());
    let port : u16 = match read("PORT") {
      Some(raw) => raw.parse().unwrap_or_else(|_| {
        log::error!("Invalid PORT value {:?}, using {}", raw, DEFAULT_PORT);
        DEFAULT_PORT
      }),
      None => DEFAULT_PORT,
    };

    return Config {
      financial_datasets_api_key, financial_datasets_url, openai_api_key, openai_base_url, llm_provider, llm_model,
      companies_house_api_key, companies_house_url, bind_address, port
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn defaults_apply_when_environment_is_empty() {
    let config = Config::from_lookup(|_| None);

    assert_eq!(config.financial_datasets_api_key, None);
    assert_eq!(config.financial_datasets_url, DEFAULT_FINANCIAL_DATASETS_URL);
    assert_eq!(config.openai_api_key, None);
    assert_eq!(config.llm_model, DEFAULT_LLM_MODEL);
    assert_eq!(config.companies_house_url, DEFAULT_COMPANIES_HOUSE_URL);
    assert_eq!(config.port, DEFAULT_PORT);
  }

  #[test]
  fn values_are_trimmed_and_blank_values_ignored() {
    let vars: HashMap<&str, &str> = HashMap::from([
      ("OPENAI_API_KEY", "  sk-test  "),
      ("FINANCIAL_DATASETS_API_KEY", "   "),
      ("PORT", "8080"),
      ("LLM_MODEL", "gpt-4o"),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.financial_datasets_api_key, None);
    assert_eq!(config.port, 8080);
    assert_eq!(config.llm_model, "gpt-4o");
  }

  #[test]
  fn invalid_port_falls_back_to_default() {
    let config = Config::from_lookup(|key| if key == "PORT" { Some("not-a-port".to_string()) } else { None });
    assert_eq!(config.port, DEFAULT_PORT);
  }
}
