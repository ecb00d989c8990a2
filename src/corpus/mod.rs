//! Corpus loading and document processing

mod loader;
mod processor;
mod splitter;

pub use loader::{CorpusLoader, LoadedPaper, PaperRecord, QuerySpec, RelevanceEntry, Section};
pub use processor::{CorpusStats, DocumentProcessor};
pub use splitter::{Span, TextSplitter};
