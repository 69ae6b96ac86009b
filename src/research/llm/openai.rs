use crate::research::llm::model_provider::{ChatMessage, LLMChatter, LLMModelConfig, LLMResponse};

use reqwest::{header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE}, Client, Response};
use serde::{Deserialize, Serialize};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;


#[derive(Serialize, Debug)]
struct ChatCompletionRequest {
  messages: Vec<ChatMessage>,
  model: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  top_p: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
  #[serde(default)]
  content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
  message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
}

/// Client for any `/chat/completions` endpoint speaking the OpenAI wire format.
pub struct OpenAICompatibleProvider {
  completions_url : String,
  api_key : Option<String>,
  client : Client
}

impl OpenAICompatibleProvider {

  pub fn new(base_url: &str, api_key: Option<String>) -> Self {
    let completions_url: String = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    OpenAICompatibleProvider { completions_url, api_key, client: Client::new() }
  }

  fn headers(&self) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &self.api_key {
      let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).context("API key is not a valid header value")?;
      headers.insert(AUTHORIZATION, bearer);
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    return Ok(headers);
  }
}

#[async_trait]
impl LLMChatter for OpenAICompatibleProvider {
  async fn chat(&self, messages: Vec<ChatMessage>, config: &LLMModelConfig) -> Result<LLMResponse> {
    let request: ChatCompletionRequest = ChatCompletionRequest {
      model: config.model_name.clone(),
      messages: messages,
      temperature: config.temperature,
      max_tokens: config.max_tokens,
      top_p: config.top_p,
    };

    let response: Response = self.client.post(&self.completions_url).headers(self.headers()?).json(&request).send().await?;

    if response.status().is_success() {
      let completion : ChatCompletionResponse = response.json().await?;
      let first : ChatChoice = completion.choices.into_iter().next().ok_or_else(|| anyhow!("No response choices received from {}", config.provider))?;
      let content: String = first.message.content.ok_or_else(|| anyhow!("Empty message content from {}", config.provider))?;
      return Ok(LLMResponse{
        content
      });
    }
    else {
      log::error!("Error getting response from {}: {:?}", config.provider, response.status());
      return Err(anyhow!("{} chat completion failed with status {}", config.provider, response.status()));
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::research::llm::model_provider::ModelProvider;
  use serde_json::json;
  use wiremock::matchers::{body_partial_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .and(header("authorization", "Bearer sk-test"))
      .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "max_tokens": 500})))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Solid balance sheet."}}]
      })))
      .mount(&server)
      .await;

    let provider = OpenAICompatibleProvider::new(&format!("{}/v1", server.uri()), Some("sk-test".to_string()));
    let config = LLMModelConfig::new(ModelProvider::OpenAI, "gpt-3.5-turbo").with_sampling(0.5, 500);
    let response = provider.chat(vec![ChatMessage::user("hi")], &config).await.unwrap();

    assert_eq!(response.content, "Solid balance sheet.");
  }

  #[tokio::test]
  async fn error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(429))
      .mount(&server)
      .await;

    let provider = OpenAICompatibleProvider::new(&server.uri(), None);
    let config = LLMModelConfig::new(ModelProvider::Ollama, "llama3");
    assert!(provider.chat(vec![ChatMessage::user("hi")], &config).await.is_err());
  }
}
