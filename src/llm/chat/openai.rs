use async_trait::async_trait;
use log::{ debug, error };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::{ ChatClient, ChatCompletion, LlmError, LlmMessage, ToolCallRequest };
use crate::llm::{ LlmConfig, LlmType };

const COMPLETIONS_ROUTE: &str = "/v1/chat/completions";

/// Client for any backend speaking the OpenAI chat-completions protocol.
pub struct OpenAIChatClient {
    http: HttpClient,
    llm_type: LlmType,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [JsonValue],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

fn no_tools(tools: &&[JsonValue]) -> bool {
    tools.is_empty()
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallRequest>>,
}

impl OpenAIChatClient {
    pub fn new(
        llm_type: LlmType,
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, LlmError> {
        let chat_model = model.unwrap_or_else(|| llm_type.default_model().to_string());
        let api_url = base_url.unwrap_or_else(|| llm_type.default_base_url().to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e|
                    LlmError::NotConfigured(format!("Invalid API key format: {}", e))
                )?
            );
        }

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            llm_type,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_none() && config.llm_type.requires_api_key() {
            return Err(LlmError::NotConfigured(format!("{} API key is required", config.llm_type)));
        }

        Self::new(
            config.llm_type,
            api_key,
            config.completion_model.clone(),
            config.base_url.clone()
        )
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(COMPLETIONS_ROUTE) {
            base.to_string()
        } else {
            format!("{}{}", base, COMPLETIONS_ROUTE)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete_with_tools(
        &self,
        messages: &[LlmMessage],
        tools: &[JsonValue]
    ) -> Result<ChatCompletion, LlmError> {
        let url = self.endpoint();
        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
            tools,
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
        };
        debug!(
            "{} chat request: {} messages, {} tools, model {}",
            self.llm_type,
            messages.len(),
            tools.len(),
            self.model
        );

        let resp = self.http.post(&url).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("{} returned {}: {}", url, status, body);
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let parsed = resp.json::<OpenAIResponse>().await?;
        let message = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?.message;

        Ok(ChatCompletion {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
