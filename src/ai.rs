// src/ai.rs

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

const CHAT_MODEL: &str = "gpt-4o-2024-11-20";
const CATEGORY_PREFIX: &str = "Categories:";
const IMAGE_PROMPT_CHARS: usize = 300;
const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug)]
pub enum AiError {
    MissingApiKey,
    Transport(String),
    Api { status: u16, body: String },
    Decode(String),
    EmptyResponse,
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::MissingApiKey => write!(f, "OPENAI_API_KEY is not configured"),
            AiError::Transport(msg) => write!(f, "request failed: {}", msg),
            AiError::Api { status, body } => write!(f, "OpenAI API error ({}): {}", status, body),
            AiError::Decode(msg) => write!(f, "failed to decode response: {}", msg),
            AiError::EmptyResponse => write!(f, "OpenAI API returned no result"),
        }
    }
}

impl std::error::Error for AiError {}

/// Generative helpers used when article content is created.
#[async_trait]
pub trait ContentAssistant: Send + Sync {
    /// Picks relevant names out of `categories` for `content`.
    async fn recommend_categories(
        &self,
        content: &str,
        categories: &[String],
    ) -> Result<Vec<String>, AiError>;

    /// Returns the URL of one square illustration for `content`.
    async fn generate_image(&self, content: &str) -> Result<String, AiError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// OpenAI-backed assistant. Every call is a single POST, never retried.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.api_key.as_deref().ok_or(AiError::MissingApiKey)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, AiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let api_key = self.api_key()?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentAssistant for OpenAiClient {
    async fn recommend_categories(
        &self,
        content: &str,
        categories: &[String],
    ) -> Result<Vec<String>, AiError> {
        let prompt = category_prompt(content, categories);
        tracing::debug!("Category prompt sent to OpenAI:\n{}", prompt);

        let request = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an AI that helps suggest relevant article categories based on content.",
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 500,
        };

        let response: ChatResponse = self.post("/v1/chat/completions", &request).await?;
        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AiError::EmptyResponse)?;

        tracing::debug!("Response from OpenAI: {}", reply);
        Ok(parse_categories(&reply))
    }

    async fn generate_image(&self, content: &str) -> Result<String, AiError> {
        // Fail before building the prompt when unconfigured.
        self.api_key()?;

        let prompt = format!(
            "Generate a high-quality, visually appealing image based on the following article content. Avoid adding any text or words to the image. Content: {}",
            truncate_for_prompt(content, IMAGE_PROMPT_CHARS)
        );

        let request = ImageRequest {
            prompt: &prompt,
            n: 1,
            size: IMAGE_SIZE,
        };

        let response: ImageResponse = self.post("/v1/images/generations", &request).await?;
        let url = response
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or(AiError::EmptyResponse)?;

        Url::parse(&url).map_err(|e| AiError::Decode(format!("invalid image url: {}", e)))?;
        Ok(url)
    }
}

fn category_prompt(content: &str, categories: &[String]) -> String {
    format!(
        "Based on the article content below, suggest the most relevant categories from the provided list.\n\n\
         Content:\n{}\n\n\
         Available Categories (choose relevant ones):\n{}\n\n\
         Respond in the following format:\n\
         {} [comma-separated relevant category names]\n",
        content,
        categories.join(", "),
        CATEGORY_PREFIX
    )
}

/// Reads the `Categories:` line of a reply. No such line yields an empty list.
pub fn parse_categories(reply: &str) -> Vec<String> {
    reply
        .lines()
        .find_map(|line| line.trim().strip_prefix(CATEGORY_PREFIX))
        .map(|items| {
            items
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Keeps the first `max_chars` characters, marking the cut with `...`.
pub fn truncate_for_prompt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
