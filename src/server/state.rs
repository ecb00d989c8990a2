//! Shared server state

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::rag::RagSystem;

/// Shared application state, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    system: Arc<RagSystem>,
}

impl AppState {
    /// Build the RAG system and ingest the corpus
    pub async fn new(config: RagConfig) -> Result<Self> {
        let system = RagSystem::new(config)?;
        system.initialize().await?;
        Ok(Self {
            system: Arc::new(system),
        })
    }

    /// The RAG system
    pub fn system(&self) -> &RagSystem {
        &self.system
    }

    /// Whether the index holds any chunks
    pub fn is_ready(&self) -> bool {
        !self.system.index().is_empty()
    }
}
