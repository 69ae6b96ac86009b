use serde::{Serialize, Deserialize};
use std::str::FromStr;
use std::fmt;
use anyhow::{Result};
use async_trait::async_trait;

/// Providers reachable through an OpenAI-compatible chat completions API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelProvider {
  OpenAI,
  Groq,
  Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMModelConfig {
  pub provider: ModelProvider,
  pub model_name: String,
  pub temperature: Option<f32>,
  pub max_tokens: Option<u32>,
  pub top_p : Option<f32>
}

impl LLMModelConfig {
  pub fn new(provider: ModelProvider, model_name: &str) -> Self {
    LLMModelConfig { provider, model_name: model_name.to_string(), temperature: None, max_tokens: None, top_p: None }
  }

  pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
    self.temperature = Some(temperature);
    self.max_tokens = Some(max_tokens);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: String, // "system", "user" or "assistant"
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: &str) -> Self {
    ChatMessage { role: "system".to_string(), content: content.to_string() }
  }

  pub fn user(content: &str) -> Self {
    ChatMessage { role: "user".to_string(), content: content.to_string() }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
  pub content: String,
}

impl fmt::Display for ModelProvider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ModelProvider::OpenAI => write!(f, "OpenAI"),
      ModelProvider::Groq => write!(f, "Groq"),
      ModelProvider::Ollama => write!(f, "Ollama"),
    }
  }
}

impl FromStr for ModelProvider {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "openai" => Ok(ModelProvider::OpenAI),
      "groq" => Ok(ModelProvider::Groq),
      "ollama" => Ok(ModelProvider::Ollama),
      _ => Err(format!("Unknown model provider: {}", s)),
    }
  }
}

#[async_trait]
pub trait LLMChatter : Send + Sync {
  async fn chat(&self, messages: Vec<ChatMessage>,config : &LLMModelConfig) -> Result<LLMResponse>;

}
