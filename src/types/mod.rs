//! Core data types for documents, queries, and responses

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkSource, ContentType, Document};
pub use query::QueryRequest;
pub use response::{Answer, Citation, CollectionInfo, SearchHit, SystemStats};
