use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const PERPLEXITY_ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";

/// Model used for summarizing and drafting.
pub const DEFAULT_DRAFTING_MODEL: &str = "gpt-4o-mini";
/// Model used for case-law research.
pub const DEFAULT_RESEARCH_MODEL: &str = "sonar-pro";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest error body kept in an [`AssistError::Status`].
const MAX_ERROR_BODY: usize = 300;

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("nothing to {0}: input is empty")]
    EmptyInput(&'static str),
    #[error("{backend} request failed: {message}")]
    Request { backend: String, message: String },
    #[error("{backend} rate limited (429)")]
    RateLimited { backend: String },
    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },
    #[error("{backend} sent an unreadable response: {message}")]
    Decode { backend: String, message: String },
    #[error("{backend} returned no message content")]
    EmptyResponse { backend: String },
}

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AssistError>> + Send + 'a>>;

/// A hosted language model answering one prompt at a time.
///
/// Each call is a single request/response exchange; implementations keep no
/// conversation state.
pub trait ChatBackend: Send + Sync {
    /// Name used in logs and errors (e.g. "openai").
    fn name(&self) -> &str;

    /// Send `prompt` as a single user message and return the reply text.
    fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletions {
    name: String,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ChatCompletions {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// OpenAI with the default drafting model.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", OPENAI_ENDPOINT, api_key, DEFAULT_DRAFTING_MODEL)
    }

    /// Perplexity with the default research model.
    pub fn perplexity(api_key: impl Into<String>) -> Self {
        Self::new(
            "perplexity",
            PERPLEXITY_ENDPOINT,
            api_key,
            DEFAULT_RESEARCH_MODEL,
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a connection pool with other clients.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for ChatCompletions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletions")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChatBackend for ChatCompletions {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> ChatFuture<'a> {
        Box::pin(async move {
            let request_error = |e: reqwest::Error| AssistError::Request {
                backend: self.name.clone(),
                message: e.to_string(),
            };

            let body = ChatRequest {
                model: &self.model,
                messages: [RequestMessage {
                    role: "user",
                    content: prompt,
                }],
            };

            tracing::debug!(
                backend = %self.name,
                model = %self.model,
                prompt_chars = prompt.chars().count(),
                "sending chat completion"
            );

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(request_error)?;

            let status = resp.status();
            if status.as_u16() == 429 {
                return Err(AssistError::RateLimited {
                    backend: self.name.clone(),
                });
            }
            let text = resp.text().await.map_err(request_error)?;
            if !status.is_success() {
                return Err(AssistError::Status {
                    backend: self.name.clone(),
                    status: status.as_u16(),
                    body: text.chars().take(MAX_ERROR_BODY).collect(),
                });
            }

            let reply = parse_completion(&self.name, &text)?;
            tracing::debug!(
                backend = %self.name,
                reply_chars = reply.chars().count(),
                "chat completion received"
            );
            Ok(reply)
        })
    }
}

/// Pull `choices[0].message.content` out of a completion response body.
fn parse_completion(backend: &str, body: &str) -> Result<String, AssistError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| AssistError::Decode {
        backend: backend.to_string(),
        message: e.to_string(),
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AssistError::EmptyResponse {
            backend: backend.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: [RequestMessage {
                role: "user",
                content: "Summarise this notice",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Summarise this notice");
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Summary here"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion("openai", body).unwrap(), "Summary here");
    }

    #[test]
    fn missing_or_null_content_is_empty_response() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"error":"nope"}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
        ] {
            let err = parse_completion("perplexity", body).unwrap_err();
            assert!(matches!(err, AssistError::EmptyResponse { .. }), "{body}");
        }
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = parse_completion("openai", "<html>502</html>").unwrap_err();
        assert!(matches!(err, AssistError::Decode { .. }));
        assert!(err.to_string().starts_with("openai sent an unreadable response"));
    }

    #[test]
    fn constructors_pick_defaults() {
        let openai = ChatCompletions::openai("sk-test");
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.model(), DEFAULT_DRAFTING_MODEL);

        let research = ChatCompletions::perplexity("pplx-test").with_model("sonar");
        assert_eq!(research.name(), "perplexity");
        assert_eq!(research.model(), "sonar");
        assert!(!format!("{research:?}").contains("pplx-test"));
    }
}
