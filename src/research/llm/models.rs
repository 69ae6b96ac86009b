use std::env;
use std::str::FromStr;
use std::sync::Arc;
use anyhow::{Result, anyhow};

use crate::app::config::Config;
use crate::research::llm::model_provider::{LLMChatter, LLMModelConfig, ModelProvider};
use crate::research::llm::openai::OpenAICompatibleProvider;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// A configured chat client plus the model settings it is called with.
#[derive(Clone)]
pub struct ConfiguredModel {
  pub chatter: Arc<dyn LLMChatter>,
  pub config: LLMModelConfig,
}

pub fn get_model(config: &LLMModelConfig, base_url: Option<&str>, api_key: Option<String>) -> Result<Arc<dyn LLMChatter>> {
  log::info!("Initializing LLM client for provider: {}, model: {}", config.provider, config.model_name);

  match config.provider {
    ModelProvider::OpenAI | ModelProvider::Groq => {
      let api_key: String = api_key.ok_or_else(|| anyhow!("{} requires an API key", config.provider))?;
      let default_url: &str = if config.provider == ModelProvider::Groq { GROQ_BASE_URL } else { crate::app::config::DEFAULT_OPENAI_BASE_URL };
      let client = OpenAICompatibleProvider::new(base_url.unwrap_or(default_url), Some(api_key));
      return Ok(Arc::new(client))
    }
    ModelProvider::Ollama => {
      let ollama_host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
      let default_base_url = format!("http://{}:11434/v1", ollama_host);
      let base_url: String = base_url.map(str::to_string).unwrap_or(default_base_url);
      log::info!("Ollama configured with base_url: {}", base_url);
      return Ok(Arc::new(OpenAICompatibleProvider::new(&base_url, api_key)))
    }
  }
}

/// Builds the model used for summaries and ticker resolution, or `None` when
/// the process has no usable LLM configuration.
pub fn configured_model(config: &Config) -> Option<ConfiguredModel> {
  let provider: ModelProvider = match ModelProvider::from_str(&config.llm_provider) {
    Ok(provider) => provider,
    Err(e) => {
      log::error!("{}; LLM features disabled", e);
      return None;
    }
  };

  // A custom base URL only applies when it was set explicitly.
  let base_url: Option<&str> = Some(config.openai_base_url.as_str())
    .filter(|url| *url != crate::app::config::DEFAULT_OPENAI_BASE_URL || provider == ModelProvider::OpenAI);

  let model_config: LLMModelConfig = LLMModelConfig::new(provider, &config.llm_model);
  match get_model(&model_config, base_url, config.openai_api_key.clone()) {
    Ok(chatter) => Some(ConfiguredModel { chatter, config: model_config }),
    Err(e) => {
      log::warn!("LLM features disabled: {:#}", e);
      None
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hosted_providers_require_an_api_key() {
    let config = LLMModelConfig::new(ModelProvider::OpenAI, "gpt-3.5-turbo");
    assert!(get_model(&config, None, None).is_err());
    assert!(get_model(&config, None, Some("sk-test".to_string())).is_ok());
  }

  #[test]
  fn ollama_needs_no_key() {
    let config = LLMModelConfig::new(ModelProvider::Ollama, "llama3.1:latest");
    assert!(get_model(&config, Some("http://localhost:11434/v1"), None).is_ok());
  }

  #[test]
  fn configured_model_is_absent_without_key() {
    let config = Config::from_lookup(|_| None);
    assert!(configured_model(&config).is_none());

    let config = Config::from_lookup(|key| if key == "OPENAI_API_KEY" { Some("sk-test".to_string()) } else { None });
    let model = configured_model(&config).unwrap();
    assert_eq!(model.config.provider, ModelProvider::OpenAI);
    assert_eq!(model.config.model_name, "gpt-3.5-turbo");
  }
}
