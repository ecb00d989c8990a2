//! Interactive CLI for the RAG system
//!
//! Commands: `quit`/`exit`, `rebuild`, `stats`, `search <phrase>`, anything
//! else is asked as a question.

use std::io::{self, BufRead, Write};

use openrag::{config::RagConfig, Answer, QueryRequest, RagSystem};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicode_segmentation::UnicodeSegmentation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openrag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Research Paper Q&A");
    println!("==================\n");

    let config = RagConfig::load_or_default();
    let generation_enabled = RagConfig::openai_api_key().is_some();
    if !generation_enabled {
        println!("OPENAI_API_KEY is not set: running in retrieval-only mode.");
        println!("Set the key to enable answer generation.\n");
    }

    let system = RagSystem::new(config)?;
    if !system.health_check().await.unwrap_or(false) {
        println!("Warning: embedding server is not reachable; indexing will fail.");
        println!("Start one with: ollama serve && ollama pull all-minilm\n");
    }
    print!("Loading corpus... ");
    io::stdout().flush()?;
    system.initialize().await?;
    println!("{} chunks indexed.", system.index().len());
    print_stats(&system);

    println!("Commands: quit, rebuild, stats, search <phrase>, or ask a question.\n");

    let stdin = io::stdin();
    loop {
        print!("Your question: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => break,
            "rebuild" => {
                print!("Rebuilding index... ");
                io::stdout().flush()?;
                let ingested = system.rebuild().await?;
                println!("done ({} papers, {} chunks).\n", ingested, system.index().len());
            }
            "stats" => {
                print_stats(&system);
            }
            _ if input.starts_with("search ") => {
                let phrase = input.trim_start_matches("search ").trim();
                run_search(&system, phrase).await;
            }
            question => {
                run_question(&system, question).await;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn print_stats(system: &RagSystem) {
    let stats = system.stats();
    println!("\nCollection: {}", stats.collection.collection_name);
    println!("  Documents: {}", stats.collection.document_count);
    println!("  Chunks: {}", stats.collection.chunk_count);
    println!("  Embedding model: {}", stats.collection.embedding_model);
    println!("  Index path: {}", stats.collection.persist_path);
    println!(
        "  Chunking: {} chars, {} overlap",
        stats.chunk_size, stats.chunk_overlap
    );
    println!("  Top-K: {}", stats.top_k);
    println!(
        "  LLM: {} ({})\n",
        stats.llm_model,
        if stats.llm_configured {
            "configured"
        } else {
            "no API key"
        }
    );
}

async fn run_search(system: &RagSystem, phrase: &str) {
    if phrase.is_empty() {
        println!("Usage: search <phrase>\n");
        return;
    }
    match system.search(&QueryRequest::new(phrase)).await {
        Ok(hits) if hits.is_empty() => println!("No matching chunks.\n"),
        Ok(hits) => {
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "[{}] {:.3}  {} ({})",
                    i + 1,
                    hit.similarity,
                    hit.chunk.source.format_citation(),
                    hit.chunk.content_type
                );
                println!("    {}\n", preview(&hit.chunk.text, 160));
            }
        }
        Err(e) => println!("Search failed: {}\n", e),
    }
}

async fn run_question(system: &RagSystem, question: &str) {
    match system.ask(&QueryRequest::new(question)).await {
        Ok(answer) => print_answer(&answer),
        Err(e) => println!("Error: {}\n", e),
    }
}

fn print_answer(answer: &Answer) {
    println!("\n{}\n", answer.text);
    if !answer.cited_chunks.is_empty() {
        println!("Sources:");
        for citation in answer.cited_chunks.iter().take(3) {
            println!(
                "  - {} (similarity {:.3})",
                citation.format_inline(),
                citation.similarity_score
            );
        }
    }
    println!(
        "({} chunks, {} ms)\n",
        answer.chunks_retrieved, answer.processing_time_ms
    );
}

fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    let truncated: String = flat.graphemes(true).take(max).collect();
    if truncated.len() < flat.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
