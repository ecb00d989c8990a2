//! OpenAI API client for answer generation and embeddings

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::types::Citation;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// OpenAI API client with automatic retry
///
/// Requires an API key. Also usable as an embedding provider when the
/// `openai` backend is selected.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    config: LlmConfig,
    embedding_model: String,
    embedding_dimensions: usize,
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
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::llm(format!("Failed to create HTTP client: {}", e)))?;

        let mut base_url = config.base_url.clone();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            api_key,
            base_url,
            config: config.clone(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
        })
    }

    /// Override the embedding model and its dimensionality
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimensions = dimensions;
        self
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "OpenAI request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::llm("Unknown error")))
    }

    async fn chat_completion(&self, prompt: String) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let model = self.config.model.clone();
        let temperature = self.config.temperature;
        let max_tokens = self.config.max_tokens;
        let api_key = self.api_key.clone();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let prompt = prompt.clone();
            let model = model.clone();
            let api_key = api_key.clone();
            let client = client.clone();

            async move {
                let request = ChatRequest {
                    model: &model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: &prompt,
                    }],
                    temperature,
                    max_tokens,
                };

                let response = client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", api_key))
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::llm(format!("Chat request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::llm(format!(
                        "Chat completion failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let chat: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::llm(format!("Failed to parse chat response: {}", e)))?;

                chat.choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| Error::llm("Chat completion returned no content"))
            }
        })
        .await
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        citations: &[Citation],
    ) -> Result<String> {
        let prompt = PromptBuilder::build_rag_prompt(question, context, citations);
        tracing::info!("Generating answer with model: {}", self.config.model);
        self.chat_completion(prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);

        match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("Embeddings response was empty"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let model = self.embedding_model.clone();
        let api_key = self.api_key.clone();
        let client = self.client.clone();
        let texts = texts.to_vec();

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let api_key = api_key.clone();
            let client = client.clone();
            let texts = texts.clone();

            async move {
                let request = EmbeddingsRequest {
                    model: &model,
                    input: texts.iter().map(String::as_str).collect(),
                };

                let response = client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", api_key))
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embeddings request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::embedding(format!(
                        "Embeddings failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let mut parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embeddings response: {}", e))
                })?;

                if parsed.data.len() != texts.len() {
                    return Err(Error::embedding(format!(
                        "Expected {} embeddings, got {}",
                        texts.len(),
                        parsed.data.len()
                    )));
                }

                // The API may return entries out of order
                parsed.data.sort_by_key(|d| d.index);
                Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
            }
        })
        .await
    }

    fn dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        LlmProvider::health_check(self).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
