//! HTTP generators: Anthropic, OpenAI and Ollama chat APIs
//!
//! A [`Prompt`] maps onto each API's own system slot: the Anthropic
//! `system` field, or a leading `system` message for the OpenAI-compatible
//! backends. Uses ureq (sync HTTP), no async runtime needed.

use super::generator::Generator;
use super::prompts::Prompt;
use super::GeneratorError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
    Ollama,
}

impl LlmBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(LlmBackend::Anthropic),
            "openai" => Some(LlmBackend::OpenAi),
            "ollama" => Some(LlmBackend::Ollama),
            _ => None,
        }
    }

    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn signup_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::Ollama => "https://ollama.ai (no key needed, just run locally)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::Ollama => "llama3.1:8b",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, LlmBackend::OpenAi | LlmBackend::Ollama)
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmBackend::Anthropic => write!(f, "anthropic"),
            LlmBackend::OpenAi => write!(f, "openai"),
            LlmBackend::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            max_tokens: 2048,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

/// Unified LLM client, sync HTTP via ureq
pub struct AiClient {
    config: AiConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent(timeout_secs: u64) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .new_agent()
}

impl AiClient {
    pub fn new(config: AiConfig, api_key: impl Into<String>) -> Self {
        let agent = make_agent(config.timeout_secs);
        Self {
            config,
            api_key: api_key.into(),
            agent,
        }
    }

    pub fn from_env_with_config(mut config: AiConfig) -> Result<Self, GeneratorError> {
        if !config.backend.requires_api_key() {
            if let Ok(model) = env::var("OLLAMA_MODEL") {
                config.model = Some(model);
            }
            return Ok(Self::new(config, "ollama"));
        }

        let env_key = config.backend.env_key();
        let api_key = env::var(env_key).map_err(|_| GeneratorError::MissingApiKey {
            env_var: env_key.to_string(),
            signup_url: config.backend.signup_url().to_string(),
        })?;

        Ok(Self::new(config, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.config.backend
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Send one prompt and return the reply text
    pub fn complete(&self, prompt: &Prompt) -> Result<String, GeneratorError> {
        if self.config.backend.is_openai_compatible() {
            let response: OpenAiResponse = self.post(&openai_request(&self.config, prompt))?;
            response.into_text()
        } else {
            let response: AnthropicResponse = self.post(&anthropic_request(&self.config, prompt))?;
            response.into_text()
        }
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, body: &B) -> Result<R, GeneratorError> {
        let mut req = self
            .agent
            .post(self.config.backend.api_url())
            .header("Content-Type", "application/json");
        req = match self.config.backend {
            LlmBackend::Anthropic => req
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            LlmBackend::OpenAi => req.header("Authorization", &format!("Bearer {}", self.api_key)),
            LlmBackend::Ollama => req,
        };

        let response = req.send_json(body).map_err(|e| GeneratorError::Api {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(GeneratorError::Api {
                status,
                message: error_text,
            });
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| GeneratorError::Parse(e.to_string()))
    }
}

impl Generator for AiClient {
    fn generate(&self, prompt: &Prompt) -> Result<String, GeneratorError> {
        self.complete(prompt)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.backend(), self.model())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn user_message(prompt: &Prompt) -> ChatMessage<'_> {
    ChatMessage {
        role: "user",
        content: &prompt.user,
    }
}

// OpenAI-compatible API types (OpenAI, Ollama)
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

fn openai_request<'a>(config: &'a AiConfig, prompt: &'a Prompt) -> OpenAiRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !prompt.system.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: prompt.system,
        });
    }
    messages.push(user_message(prompt));
    OpenAiRequest {
        model: config.model(),
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

impl OpenAiResponse {
    fn into_text(self) -> Result<String, GeneratorError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GeneratorError::Parse("No response choices".to_string()))
    }
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

fn anthropic_request<'a>(config: &'a AiConfig, prompt: &'a Prompt) -> AnthropicRequest<'a> {
    AnthropicRequest {
        model: config.model(),
        max_tokens: config.max_tokens,
        system: prompt.system,
        messages: [user_message(prompt)],
        temperature: config.temperature,
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicResponse {
    fn into_text(self) -> Result<String, GeneratorError> {
        self.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| GeneratorError::Parse("No text content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            system: "You answer TrustArc SDK questions.",
            user: "## Question\nHow do I call openCM?\n".to_string(),
        }
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(LlmBackend::from_name("OpenAI"), Some(LlmBackend::OpenAi));
        assert_eq!(LlmBackend::from_name("claude"), Some(LlmBackend::Anthropic));
        assert_eq!(LlmBackend::from_name("command"), None);
        assert_eq!(LlmBackend::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_config_model() {
        let config = AiConfig::default();
        assert_eq!(config.model(), "claude-sonnet-4-20250514");

        let config = AiConfig {
            model: Some("custom-model".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "custom-model");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let client = AiClient::from_env_with_config(AiConfig {
            backend: LlmBackend::Ollama,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.backend(), LlmBackend::Ollama);
        assert!(client.describe().starts_with("ollama ("));
    }

    #[test]
    fn test_openai_request_leads_with_system_message() {
        let config = AiConfig {
            backend: LlmBackend::OpenAi,
            ..Default::default()
        };
        let prompt = prompt();
        let json = serde_json::to_value(openai_request(&config, &prompt)).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], prompt.system);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], prompt.user);
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_anthropic_request_uses_system_field() {
        let config = AiConfig::default();
        let prompt = prompt();
        let json = serde_json::to_value(anthropic_request(&config, &prompt)).unwrap();
        assert_eq!(json["system"], prompt.system);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(!json["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains(prompt.system));
    }

    #[test]
    fn test_empty_system_is_omitted() {
        let config = AiConfig::default();
        let prompt = Prompt {
            system: "",
            user: "hi".to_string(),
        };
        let anthropic = serde_json::to_value(anthropic_request(&config, &prompt)).unwrap();
        assert!(anthropic.get("system").is_none());
        let openai = serde_json::to_value(openai_request(&config, &prompt)).unwrap();
        assert_eq!(openai["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_text_extraction() {
        let anthropic: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"Call openCM()"}]}"#,
        )
        .unwrap();
        assert_eq!(anthropic.into_text().unwrap(), "Call openCM()");

        let openai: OpenAiResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(openai.into_text(), Err(GeneratorError::Parse(_))));
    }
}
