use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    env,
    exchange::{ChatMessage, Exchange},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const MODEL: &str = "gpt-3.5-turbo";
pub const TEMPERATURE: f64 = 0.7;

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the exchange and returns the generated reply text unmodified.
    async fn complete(&self, exchange: &Exchange) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: &'static str,
    pub temperature: f64,
}

impl ChatClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            model: MODEL,
            temperature: TEMPERATURE,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var(env::BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var(env::API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            warn!(
                "{} is not set, chat completion requests will fail authentication",
                env::API_KEY
            );
        }

        Self::new(base_url, api_key)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

pub struct OpenAiChatClient {
    http_client: reqwest::Client,
    config: ChatClientConfig,
}

impl OpenAiChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    async fn complete(&self, exchange: &Exchange) -> Result<String> {
        let url = self.config.completions_url();
        let body = CompletionRequest {
            model: self.config.model,
            temperature: self.config.temperature,
            messages: exchange.messages(),
        };

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!("Sending chat completion request to {url}");
        let response = request
            .send()
            .await
            .context("failed to reach chat completion service")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|x| x.error.message)
                .unwrap_or(text);
            bail!("chat completion service returned {status}: {detail}");
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("failed to parse chat completion response")?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("chat completion response contained no reply")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, Request, ResponseTemplate,
    };

    use super::*;
    use crate::persona::Persona;

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": MODEL,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }))
    }

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenAiChatClient {
        OpenAiChatClient::new(ChatClientConfig::new(
            server.uri(),
            api_key.map(|x| x.to_string()),
        ))
    }

    #[test_log::test(tokio::test)]
    async fn can_complete_exchange() {
        let server = MockServer::start().await;
        let question = "What cloud migration strategy should we adopt?";

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": Persona::ItConsultant.system_prompt() },
                    { "role": "user", "content": question }
                ]
            })))
            .respond_with(reply("Start with a rehost of stateless services."))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let exchange = Exchange::new(Persona::ItConsultant, question);
        let response = client.complete(&exchange).await.unwrap();

        assert_eq!(response, "Start with a rehost of stateless services.");
    }

    #[tokio::test]
    async fn reply_is_returned_unmodified() {
        let server = MockServer::start().await;
        let content = "  ### Plan\n\n1. **Assess**\n2. Move  \n";
        Mock::given(method("POST"))
            .respond_with(reply(content))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let exchange = Exchange::new(Persona::CareerAdvisor, "How do I switch careers?");

        assert_eq!(client.complete(&exchange).await.unwrap(), content);
    }

    #[tokio::test]
    async fn invalid_credential_surfaces_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided: bad-key.",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad-key"));
        let exchange = Exchange::new(Persona::ItConsultant, "hello");
        let err = client.complete(&exchange).await.unwrap_err().to_string();

        assert!(err.contains("401"), "{err}");
        assert!(err.contains("Incorrect API key provided"), "{err}");
    }

    #[tokio::test]
    async fn missing_api_key_sends_no_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(|req: &Request| !req.headers.contains_key("authorization"))
            .respond_with(ResponseTemplate::new(401).set_body_string("missing key"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let exchange = Exchange::new(Persona::ItConsultant, "hello");
        let err = client.complete(&exchange).await.unwrap_err().to_string();

        assert!(err.contains("missing key"), "{err}");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let exchange = Exchange::new(Persona::ItConsultant, "hello");

        assert!(client.complete(&exchange).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let client = OpenAiChatClient::new(ChatClientConfig::new(
            "http://127.0.0.1:9",
            Some("test-key".to_string()),
        ));
        let exchange = Exchange::new(Persona::ItConsultant, "hello");
        let err = client.complete(&exchange).await.unwrap_err();

        assert!(format!("{err:#}").contains("failed to reach chat completion service"));
    }

    #[test]
    fn completions_url_ignores_trailing_slash() {
        let config = ChatClientConfig::new("http://localhost:8080/v1/", None);
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.model, MODEL);
        assert_eq!(config.temperature, TEMPERATURE);
    }
}
