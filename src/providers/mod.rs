//! Provider traits and clients for embeddings and answer generation

mod embedding;
mod llm;
mod local;
mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::LocalEmbedder;
pub use openai::OpenAiClient;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, RagConfig};
use crate::error::{Error, Result};

/// Build the embedding provider selected by the configuration
///
/// The `openai` backend requires `OPENAI_API_KEY`; the default `local`
/// backend needs no credential.
pub fn build_embedder(config: &RagConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Local => Ok(Arc::new(LocalEmbedder::new(&config.embedding)?)),
        EmbeddingBackend::Openai => {
            let api_key = RagConfig::openai_api_key().ok_or(Error::MissingApiKey)?;
            let client = OpenAiClient::new(api_key, &config.llm)?.with_embedding_model(
                config.embedding.model.clone(),
                config.embedding.dimensions,
            );
            Ok(Arc::new(client))
        }
    }
}

/// Build the LLM provider if an API key is configured
///
/// Returns `None` when `OPENAI_API_KEY` is unset; retrieval still works,
/// generation reports a missing key.
pub fn build_llm(config: &RagConfig) -> Result<Option<Arc<dyn LlmProvider>>> {
    match RagConfig::openai_api_key() {
        Some(api_key) => {
            let client = OpenAiClient::new(api_key, &config.llm)?;
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, answer generation is disabled");
            Ok(None)
        }
    }
}
