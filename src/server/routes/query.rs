//! Query, search, and admin endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{Answer, Document, QueryRequest, SearchHit, SystemStats};

/// POST /api/query - answer a question with citations
///
/// Returns 503 `missing_api_key` when generation is requested without
/// `OPENAI_API_KEY`; `/api/search` keeps working in that case.
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answer>> {
    tracing::info!("Query: \"{}\"", request.question);
    let answer = state.system().ask(&request).await?;
    Ok(Json(answer))
}

/// Search response: hits only, no generation
#[derive(Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub count: usize,
}

/// POST /api/search - retrieval without generation
pub async fn search_chunks(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<SearchResponse>> {
    tracing::info!("Search: \"{}\"", request.question);
    let hits = state.system().search(&request).await?;
    let count = hits.len();
    Ok(Json(SearchResponse { hits, count }))
}

/// Rebuild response
#[derive(Serialize)]
pub struct RebuildResponse {
    pub papers_ingested: usize,
    pub chunk_count: usize,
}

/// POST /api/rebuild - drop the index and re-ingest the corpus
pub async fn rebuild_index(State(state): State<AppState>) -> Result<Json<RebuildResponse>> {
    let papers_ingested = state.system().rebuild().await?;
    Ok(Json(RebuildResponse {
        papers_ingested,
        chunk_count: state.system().index().len(),
    }))
}

/// GET /api/documents - list indexed documents
pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.system().index().documents())
}

/// GET /api/stats - collection and configuration statistics
pub async fn get_stats(State(state): State<AppState>) -> Json<SystemStats> {
    Json(state.system().stats())
}
