//! openrag: retrieval-augmented question answering over a paper corpus
//!
//! This crate implements the full RAG pipeline: corpus loading, chunking,
//! embedding via an external provider, vector similarity search, and
//! LLM-generated answers with source citations. It exposes a library API,
//! an interactive CLI loop, and an HTTP server.

pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod index;
pub mod providers;
pub mod rag;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use rag::RagSystem;
pub use types::{
    document::{Chunk, ChunkSource, ContentType, Document},
    query::QueryRequest,
    response::{Answer, Citation, SearchHit},
};
