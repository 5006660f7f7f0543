//! Grounded question-answering demo.
//!
//! Runs the full pipeline once against a local Ollama server with a fixed
//! ten-document corpus and a fixed question, then prints the model's
//! grounded answer. Exits non-zero if any pipeline stage fails.
//!
//! Run: `cargo run --bin qa --features demo`
//!
//! Requires Ollama at `http://localhost:11434` with the `llama3` and
//! `nomic-embed-text` models pulled.

use std::sync::Arc;

use ragpipe::ollama::{OllamaEmbedder, OllamaGenerator};
use ragpipe::{Document, InMemoryVectorIndex, Pipeline, PipelineConfig};

/// `nomic-embed-text` produces 768-dimensional vectors.
const EMBEDDING_MODEL: &str = "nomic-embed-text";
const EMBEDDING_DIMENSIONS: usize = 768;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let corpus = Document::from_texts([
        "Alex porte un bonnet vert",
        "Alex est un homme",
        "Laura conduit une voiture bleue",
        "Laura est une femme",
        "Médore joue avec une balle blanche",
        "Médore est un chien",
        "Minou fait ses griffes sur le canapé",
        "Minou est un chat",
        "Sam a les cheveux longs",
        "Sam est un enfant",
    ]);
    let question = "Que fait le chat ?";

    println!("--- Corpus ---\n");
    for document in &corpus {
        println!("{}", document.text);
    }
    println!("\n--- Question ---\n\n{question}\n");

    let config = PipelineConfig::builder()
        .collection("docs")
        .top_k(2)
        .model("llama3")
        .build()?;
    let model = config.model.clone();

    let pipeline = Pipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(OllamaEmbedder::new(EMBEDDING_MODEL, EMBEDDING_DIMENSIONS)?))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(Arc::new(OllamaGenerator::new()?))
        .build()?;

    let answer = pipeline.run(&corpus, question).await?;

    println!("--- Answer from {model} ---\n\n{answer}");
    Ok(())
}
