//! The RAG system: corpus ingestion, retrieval, and answer generation

use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::corpus::{CorpusLoader, CorpusStats, DocumentProcessor};
use crate::error::{Error, Result};
use crate::generation::{citations_from_hits, PromptBuilder};
use crate::index::{SearchFilter, VectorIndex};
use crate::providers::{self, EmbeddingProvider, LlmProvider};
use crate::types::{Answer, QueryRequest, SearchHit, SystemStats};

/// Top-level RAG system wiring the corpus, index, and providers together
///
/// Retrieval only needs the embedding backend; generation additionally
/// needs `OPENAI_API_KEY` and reports a missing key per request instead of
/// failing at startup.
pub struct RagSystem {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Option<Arc<dyn LlmProvider>>,
    index: VectorIndex,
    loader: CorpusLoader,
    processor: DocumentProcessor,
}

impl RagSystem {
    /// Build the system from configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        let embedder = providers::build_embedder(&config)?;
        let llm = providers::build_llm(&config)?;
        Self::with_providers(config, embedder, llm)
    }

    /// Build the system with explicit providers
    ///
    /// Pass `None` for the LLM to run retrieval-only; `ask` then reports a
    /// missing key per request.
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Result<Self> {
        let index = VectorIndex::open(
            Arc::clone(&embedder),
            config.collection_name.clone(),
            config.paths.vector_db_dir(),
            config.embedding.batch_size,
        )?;

        let loader = CorpusLoader::new(config.paths.corpus_dir());
        let processor = DocumentProcessor::new(&config.chunking);

        Ok(Self {
            config,
            embedder,
            llm,
            index,
            loader,
            processor,
        })
    }

    /// The vector index
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Load the corpus and index any new or changed papers
    ///
    /// Papers whose content hash is already indexed are skipped, so
    /// repeated startups do not re-embed an unchanged corpus. Returns the
    /// number of papers ingested.
    pub async fn initialize(&self) -> Result<usize> {
        let papers = self.loader.load_corpus()?;

        let queries = self.loader.load_queries()?;
        if !queries.is_empty() {
            let qrels = self.loader.load_qrels()?;
            tracing::info!(
                "Corpus ships {} benchmark queries ({} with relevance judgments)",
                queries.len(),
                qrels.len()
            );
        }

        let known = self.index.content_hashes();

        let mut ingested = 0usize;
        let mut processed = Vec::new();

        for loaded in &papers {
            match known.get(&loaded.paper.id) {
                Some(hash) if hash == &loaded.content_hash => continue,
                Some(_) => {
                    // Changed on disk, replace the stale chunks
                    self.index.remove_paper(&loaded.paper.id)?;
                }
                None => {}
            }

            let (document, chunks) = self.processor.process(loaded);
            tracing::info!(
                "Indexing paper '{}' ({} chunks)",
                document.paper_id,
                chunks.len()
            );
            self.index.add_chunks(document.clone(), chunks.clone()).await?;
            processed.push((document, chunks));
            ingested += 1;
        }

        if ingested > 0 {
            let stats = CorpusStats::compute(&processed);
            tracing::info!(
                "Ingested {} papers, {} chunks (avg {:.0} chars)",
                stats.papers_count,
                stats.total_chunks,
                stats.avg_chunk_length
            );
        } else {
            tracing::info!("Corpus unchanged, {} chunks already indexed", self.index.len());
        }

        Ok(ingested)
    }

    /// Drop the index and re-ingest the whole corpus
    pub async fn rebuild(&self) -> Result<usize> {
        self.index.reset()?;
        self.initialize().await
    }

    /// Retrieve chunks relevant to a query
    ///
    /// Works without an API key. An empty index yields empty results.
    pub async fn search(&self, request: &QueryRequest) -> Result<Vec<SearchHit>> {
        let filter = self.filter_for(request);
        self.index.search(&request.question, &filter).await
    }

    /// Answer a question with retrieval-grounded generation
    pub async fn ask(&self, request: &QueryRequest) -> Result<Answer> {
        let started = Instant::now();

        let hits = self.search(request).await?;
        if hits.is_empty() {
            return Ok(Answer::not_found(started.elapsed().as_millis() as u64));
        }

        let llm = self.llm.as_ref().ok_or(Error::MissingApiKey)?;

        let citations = citations_from_hits(&hits, &request.question);
        let context = PromptBuilder::build_context(&hits);
        let text = llm
            .generate_answer(&request.question, &context, &citations)
            .await?;

        let mut answer = Answer::new(text, citations, started.elapsed().as_millis() as u64);
        answer.model = Some(llm.model().to_string());
        if request.include_chunks {
            answer.raw_chunks = Some(hits.into_iter().map(|h| h.chunk).collect());
        }
        Ok(answer)
    }

    /// Whether answer generation is available
    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// System statistics for the stats endpoint and CLI
    pub fn stats(&self) -> SystemStats {
        SystemStats {
            collection: self.index.info(),
            chunk_size: self.config.chunking.chunk_size,
            chunk_overlap: self.config.chunking.chunk_overlap,
            top_k: self.config.search.top_k,
            llm_model: self.config.llm.model.clone(),
            llm_configured: self.llm.is_some(),
        }
    }

    /// Check the embedding backend (and LLM, when configured)
    pub async fn health_check(&self) -> Result<bool> {
        let embedder_ok = self.embedder.health_check().await?;
        let llm_ok = match &self.llm {
            Some(llm) => llm.health_check().await?,
            None => true,
        };
        Ok(embedder_ok && llm_ok)
    }

    fn filter_for(&self, request: &QueryRequest) -> SearchFilter {
        SearchFilter {
            top_k: request.top_k.unwrap_or(self.config.search.top_k),
            similarity_threshold: request
                .similarity_threshold
                .unwrap_or(self.config.search.similarity_threshold),
            content_type: request.content_type,
            document_filter: request.document_filter.clone(),
        }
    }
}
