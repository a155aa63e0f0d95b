//! Client for a Mistral-compatible chat-completions vision endpoint.
//!
//! The PNG image is sent as a base64 data URL together with a fixed prompt
//! asking for the bare text. The service reports no confidence, so results
//! carry a nominal confidence of [`NOMINAL_CONFIDENCE`].

use std::{thread, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use log::{debug, warn};
use reqwest::{StatusCode, blocking::Client};
use serde::{Deserialize, Serialize};

use crate::{
    config::OcrConfig,
    ocr::{OcrError, TextExtractor},
};

/// Confidence assigned to every result of this client.
pub const NOMINAL_CONFIDENCE: f64 = 0.9;

const PROMPT: &str = "extract all text from this image. return only the text content, no descriptions or explanations.";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.1;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: &'static str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking HTTP client implementing [`TextExtractor`].
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    retries: u32,
}

impl MistralClient {
    /// Creates a client from OCR settings.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::MissingApiKey`] if no key is configured and
    /// [`OcrError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = config.api_key().ok_or(OcrError::MissingApiKey)?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_url: config.api_url().to_string(),
            model: config.model().to_string(),
            retries: config.retries(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn request_body(&self, image: &[u8]) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: PROMPT },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url(image),
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    fn send_once(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, OcrError> {
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json()?)
    }
}

impl TextExtractor for MistralClient {
    fn extract_text(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        let body = self.request_body(image);

        let mut attempt = 0;
        loop {
            match self.send_once(&body) {
                Ok(response) => return Ok(response_text(response)),
                Err(err) if attempt < self.retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(attempt, err:%; "Text extraction request failed, retrying");
                    thread::sleep(RETRY_BACKOFF * attempt);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_available(&self) -> bool {
        let result = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .timeout(PROBE_TIMEOUT)
            .send();

        match result {
            Ok(response) => {
                debug!(status = response.status().as_u16(); "Probed text extraction service");
                response.status() == StatusCode::OK
            }
            Err(err) => {
                debug!(err:%; "Text extraction service unreachable");
                false
            }
        }
    }

    fn confidence(&self) -> f64 {
        NOMINAL_CONFIDENCE
    }
}

/// Transport failures and server errors are worth another attempt; client
/// errors and malformed responses are not.
fn is_retryable(err: &OcrError) -> bool {
    match err {
        OcrError::Http(err) => !err.is_decode(),
        OcrError::Status { status, .. } => *status >= 500,
        OcrError::MissingApiKey | OcrError::Response(_) => false,
    }
}

fn response_text(response: ChatResponse) -> Option<String> {
    let content = response.choices.into_iter().next()?.message.content?;
    let content = content.trim();
    (!content.is_empty()).then(|| content.to_string())
}

/// Images reach the client already re-encoded as PNG.
fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> MistralClient {
        let mut config = OcrConfig::default();
        config.set_api_key("test-key");
        config.set_api_url("http://localhost:9/v1/");
        MistralClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = MistralClient::new(&OcrConfig::default());

        assert!(matches!(result, Err(OcrError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            client().endpoint("chat/completions"),
            "http://localhost:9/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body(b"\x89PNG")).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "pixtral-12b-2409",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": PROMPT },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,iVBORw==" } }
                    ]
                }],
                "max_tokens": 1000,
                "temperature": 0.1
            })
        );
    }

    #[test]
    fn test_response_text() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  ACME Corp \n" } }]
        }))
        .unwrap();
        assert_eq!(response_text(response), Some("ACME Corp".to_string()));

        let empty: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(response_text(empty), None);

        let blank: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": " " } }] }))
                .unwrap();
        assert_eq!(response_text(blank), None);
    }

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(&OcrError::Status {
            status: 503,
            body: String::new()
        }));
        assert!(!is_retryable(&OcrError::Status {
            status: 401,
            body: String::new()
        }));
        assert!(!is_retryable(&OcrError::Response("bad".to_string())));
    }

    #[test]
    fn test_confidence_is_nominal() {
        assert_eq!(client().confidence(), NOMINAL_CONFIDENCE);
    }
}
