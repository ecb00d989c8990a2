//! Corpus loader for paper records and plain text files

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// A section of a paper: prose text plus any tables and image captions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    /// Section prose
    #[serde(default)]
    pub text: String,
    /// Tables keyed by table id, rendered as text
    #[serde(default)]
    pub tables: HashMap<String, String>,
    /// Image captions keyed by image id
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// A paper record as stored in the corpus directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Corpus identifier
    pub id: String,
    /// Paper title
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub summary: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Paper body, section by section
    pub sections: Vec<Section>,
}

/// A paper loaded from disk, with its provenance
#[derive(Debug, Clone)]
pub struct LoadedPaper {
    /// The parsed record
    pub paper: PaperRecord,
    /// Path of the source file, relative to the corpus directory when possible
    pub source_path: String,
    /// SHA-256 of the raw file contents, for change detection
    pub content_hash: String,
}

/// A benchmark query (optional `queries.json` companion file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Query text
    pub query: String,
    /// Query kind as labeled by the benchmark (e.g. "abstractive")
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Expected source modality (e.g. "text")
    #[serde(default)]
    pub source: Option<String>,
}

/// A query-to-document relevance judgment (optional `qrels.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceEntry {
    /// Relevant document id
    pub doc_id: String,
    /// Relevant section index within that document
    #[serde(default)]
    pub section_id: usize,
}

/// Loads paper records from the corpus directory
pub struct CorpusLoader {
    corpus_dir: PathBuf,
}

impl CorpusLoader {
    /// Create a loader for the given corpus directory
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
        }
    }

    /// Load all documents from the corpus
    ///
    /// Reads `*.json` paper records and wraps plain `*.txt`/`*.md` files as
    /// single-section papers. Unparsable files are skipped with a warning.
    /// When the corpus directory is missing or empty, a small built-in sample
    /// corpus is written first so the system is usable out of the box.
    pub fn load_corpus(&self) -> Result<Vec<LoadedPaper>> {
        if !self.corpus_dir.exists() || self.is_dir_empty() {
            tracing::warn!(
                "Corpus directory {} is empty, creating sample data",
                self.corpus_dir.display()
            );
            self.create_sample_data()?;
        }

        let mut papers = Vec::new();

        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            let loaded = match ext.as_str() {
                "json" => {
                    // Companion benchmark files are not paper records
                    if Self::is_companion_file(path) {
                        continue;
                    }
                    self.load_json_paper(path)
                }
                "txt" | "md" => self.load_text_paper(path),
                _ => continue,
            };

            match loaded {
                Ok(paper) => papers.push(paper),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        // Stable order regardless of directory iteration
        papers.sort_by(|a, b| a.paper.id.cmp(&b.paper.id));

        tracing::info!("Loaded {} documents from corpus", papers.len());
        Ok(papers)
    }

    /// Load benchmark queries from `queries.json`, if present
    pub fn load_queries(&self) -> Result<HashMap<String, QuerySpec>> {
        let path = self.corpus_dir.join("queries.json");
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load relevance judgments from `qrels.json`, if present
    pub fn load_qrels(&self) -> Result<HashMap<String, RelevanceEntry>> {
        let path = self.corpus_dir.join("qrels.json");
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn is_companion_file(path: &Path) -> bool {
        matches!(
            path.file_name().and_then(|n| n.to_str()),
            Some("queries.json") | Some("qrels.json")
        )
    }

    fn is_dir_empty(&self) -> bool {
        std::fs::read_dir(&self.corpus_dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    fn load_json_paper(&self, path: &Path) -> Result<LoadedPaper> {
        let raw = std::fs::read(path)?;
        let paper: PaperRecord = serde_json::from_slice(&raw).map_err(|e| {
            crate::error::Error::corpus(path.display().to_string(), e.to_string())
        })?;

        Ok(LoadedPaper {
            paper,
            source_path: self.relative_path(path),
            content_hash: content_hash(&raw),
        })
    }

    /// Wrap a plain text or markdown file as a single-section paper
    fn load_text_paper(&self, path: &Path) -> Result<LoadedPaper> {
        let raw = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&raw).into_owned();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());

        let paper = PaperRecord {
            id: stem.clone(),
            title: stem,
            authors: Vec::new(),
            categories: Vec::new(),
            summary: String::new(),
            published: None,
            updated: None,
            sections: vec![Section {
                text,
                tables: HashMap::new(),
                images: HashMap::new(),
            }],
        };

        Ok(LoadedPaper {
            paper,
            source_path: self.relative_path(path),
            content_hash: content_hash(&raw),
        })
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.corpus_dir)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Write the built-in sample corpus
    pub fn create_sample_data(&self) -> Result<()> {
        std::fs::create_dir_all(&self.corpus_dir)?;

        for paper in sample_papers() {
            let path = self.corpus_dir.join(format!("{}.json", paper.id));
            let content = serde_json::to_string_pretty(&paper)?;
            std::fs::write(path, content)?;
        }

        tracing::info!("Created sample corpus in {}", self.corpus_dir.display());
        Ok(())
    }
}

/// SHA-256 content hash, hex-encoded
pub(crate) fn content_hash(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hex::encode(hasher.finalize())
}

fn sample_papers() -> Vec<PaperRecord> {
    vec![
        PaperRecord {
            id: "sample_001".to_string(),
            title: "Introduction to Machine Learning".to_string(),
            authors: vec!["John Doe".to_string(), "Jane Smith".to_string()],
            categories: vec!["cs.LG".to_string(), "cs.AI".to_string()],
            summary: "This paper provides an introduction to machine learning concepts and applications.".to_string(),
            published: Some("2024-01-01".to_string()),
            updated: Some("2024-01-01".to_string()),
            sections: vec![
                Section {
                    text: "Machine learning is a subset of artificial intelligence that focuses on algorithms that can learn from data. The main types of machine learning include supervised learning, unsupervised learning, and reinforcement learning.".to_string(),
                    ..Default::default()
                },
                Section {
                    text: "Supervised learning involves training a model on labeled data. Common algorithms include linear regression, decision trees, and neural networks. The goal is to learn a mapping from inputs to outputs.".to_string(),
                    ..Default::default()
                },
            ],
        },
        PaperRecord {
            id: "sample_002".to_string(),
            title: "Deep Learning Fundamentals".to_string(),
            authors: vec!["Alice Johnson".to_string(), "Bob Wilson".to_string()],
            categories: vec!["cs.LG".to_string(), "cs.NE".to_string()],
            summary: "This paper covers the fundamentals of deep learning and neural networks.".to_string(),
            published: Some("2024-01-15".to_string()),
            updated: Some("2024-01-15".to_string()),
            sections: vec![
                Section {
                    text: "Deep learning is a subset of machine learning that uses neural networks with multiple layers. These networks can learn complex patterns in data through backpropagation.".to_string(),
                    ..Default::default()
                },
                Section {
                    text: "Convolutional Neural Networks (CNNs) are particularly effective for image recognition tasks. They use convolutional layers to detect features in images.".to_string(),
                    ..Default::default()
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_corpus_gets_sample_data() {
        let dir = TempDir::new().unwrap();
        let loader = CorpusLoader::new(dir.path().join("corpus"));

        let papers = loader.load_corpus().unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].paper.id, "sample_001");
        assert_eq!(papers[0].paper.sections.len(), 2);
    }

    #[test]
    fn loads_plain_text_as_single_section() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Some plain notes.").unwrap();
        let loader = CorpusLoader::new(dir.path());

        let papers = loader.load_corpus().unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].paper.id, "notes");
        assert_eq!(papers[0].paper.sections[0].text, "Some plain notes.");
    }

    #[test]
    fn invalid_json_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(
            dir.path().join("ok.json"),
            serde_json::to_string(&sample_papers()[0]).unwrap(),
        )
        .unwrap();
        let loader = CorpusLoader::new(dir.path());

        let papers = loader.load_corpus().unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].paper.id, "sample_001");
    }

    #[test]
    fn loads_benchmark_queries_and_qrels() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("queries.json"),
            r#"{
                "query_001": {
                    "query": "What is supervised learning?",
                    "type": "abstractive",
                    "source": "text"
                }
            }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("qrels.json"),
            r#"{ "query_001": { "doc_id": "sample_001", "section_id": 1 } }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "filler").unwrap();
        let loader = CorpusLoader::new(dir.path());

        let queries = loader.load_queries().unwrap();
        assert_eq!(queries.len(), 1);
        let spec = &queries["query_001"];
        assert_eq!(spec.query, "What is supervised learning?");
        assert_eq!(spec.kind.as_deref(), Some("abstractive"));
        assert_eq!(spec.source.as_deref(), Some("text"));

        let qrels = loader.load_qrels().unwrap();
        assert_eq!(qrels["query_001"].doc_id, "sample_001");
        assert_eq!(qrels["query_001"].section_id, 1);

        // Companion files are not mistaken for paper records
        let papers = loader.load_corpus().unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].paper.id, "notes");
    }

    #[test]
    fn missing_companion_files_load_as_empty() {
        let dir = TempDir::new().unwrap();
        let loader = CorpusLoader::new(dir.path());
        assert!(loader.load_queries().unwrap().is_empty());
        assert!(loader.load_qrels().unwrap().is_empty());
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }
}
