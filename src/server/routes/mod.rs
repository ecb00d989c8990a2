//! API routes for the RAG server

pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query_rag))
        .route("/search", post(query::search_chunks))
        .route("/rebuild", post(query::rebuild_index))
        .route("/documents", get(query::list_documents))
        .route("/stats", get(query::get_stats))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "openrag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "RAG system over a paper corpus with citation-aware answers",
        "endpoints": {
            "POST /api/query": "Ask a question, answered with citations",
            "POST /api/search": "Retrieve matching chunks without generation",
            "POST /api/rebuild": "Drop the index and re-ingest the corpus",
            "GET /api/documents": "List indexed documents",
            "GET /api/stats": "Collection and configuration statistics"
        }
    }))
}
