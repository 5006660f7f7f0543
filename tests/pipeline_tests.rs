//! End-to-end pipeline tests against in-memory backends.

use std::sync::Arc;

use async_trait::async_trait;
use ragpipe::{
    Document, EmbeddingProvider, InMemoryVectorIndex, LanguageModel, MockEmbedder,
    MockLanguageModel, Pipeline, PipelineConfig, RagError, RetrievalService, Stage, VectorIndex,
};

/// An embedding double that maps text onto a fixed vocabulary: each
/// component counts occurrences of one vocabulary word, L2-normalized.
/// Texts sharing words land close together, which gives the tests a
/// semantic-looking ranking without a real model.
struct VocabEmbedder {
    vocab: Vec<String>,
}

impl VocabEmbedder {
    fn new(vocab: &[&str]) -> Self {
        Self { vocab: vocab.iter().map(|w| w.to_lowercase()).collect() }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.vocab.len()];
        let lowered = text.to_lowercase();
        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            if let Some(i) = self.vocab.iter().position(|known| known == word) {
                v[i] += 1.0;
            }
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for VocabEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> ragpipe::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocab.len()
    }
}

/// An embedding double whose every call fails.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[&str]) -> ragpipe::Result<Vec<Vec<f32>>> {
        Err(RagError::Embedding { provider: "failing".into(), message: "backend down".into() })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// A model double whose every call fails.
struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, model: &str, _prompt: &str) -> ragpipe::Result<String> {
        Err(RagError::Generation { model: model.to_string(), message: "model offline".into() })
    }
}

const FRENCH_CORPUS: [&str; 10] = [
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
];

const FRENCH_QUESTION: &str = "Que fait le chat ?";

/// Vocabulary covering every word of the corpus and the question.
fn french_embedder() -> VocabEmbedder {
    VocabEmbedder::new(&[
        "alex", "porte", "un", "bonnet", "vert", "est", "homme", "laura", "conduit", "une",
        "voiture", "bleue", "femme", "médore", "joue", "avec", "balle", "blanche", "chien",
        "minou", "fait", "ses", "griffes", "sur", "le", "canapé", "chat", "sam", "a", "les",
        "cheveux", "longs", "enfant", "que",
    ])
}

async fn seeded_index(embedder: &dyn EmbeddingProvider, corpus: &[Document]) -> InMemoryVectorIndex {
    let index = InMemoryVectorIndex::new();
    index.create_collection("docs", embedder.dimensions()).await.unwrap();
    let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
    let vectors = embedder.embed_batch(&texts).await.unwrap();
    index.upsert("docs", corpus, &vectors).await.unwrap();
    index
}

#[tokio::test]
async fn querying_a_documents_own_text_returns_that_document() {
    let embedder = MockEmbedder::new(32);
    let corpus = Document::from_texts(FRENCH_CORPUS);
    let index = seeded_index(&embedder, &corpus).await;

    for document in &corpus {
        let vector = embedder.embed(&document.text).await.unwrap();
        let matches = index.query("docs", &vector, 1).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].document.id, document.id);
        assert!(matches[0].distance < 1e-3);
    }
}

#[tokio::test]
async fn k_larger_than_collection_returns_all_documents_ranked() {
    let embedder = MockEmbedder::new(32);
    let corpus = Document::from_texts(["un", "deux", "trois"]);
    let index = seeded_index(&embedder, &corpus).await;

    let vector = embedder.embed("quatre").await.unwrap();
    let matches = index.query("docs", &vector, 10).await.unwrap();

    assert_eq!(matches.len(), 3);
    let mut ids: Vec<&str> = matches.iter().map(|m| m.document.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    for window in matches.windows(2) {
        assert!(window[0].distance <= window[1].distance);
    }
}

#[tokio::test]
async fn retrieve_clamps_k_to_the_collection_size() {
    let embedder = Arc::new(MockEmbedder::new(32));
    let corpus = Document::from_texts(["un", "deux", "trois"]);
    let index = Arc::new(seeded_index(embedder.as_ref(), &corpus).await);

    let retrieval = RetrievalService::new(embedder, index, ", ");
    let context = retrieval.retrieve("docs", "quatre", 10).await.unwrap();

    // All three document texts present, none duplicated.
    assert_eq!(context.split(", ").count(), 3);
    for text in ["un", "deux", "trois"] {
        assert!(context.split(", ").any(|part| part == text));
    }
}

#[tokio::test]
async fn retrieve_is_deterministic_for_fixed_state() {
    let embedder = Arc::new(french_embedder());
    let corpus = Document::from_texts(FRENCH_CORPUS);
    let index = Arc::new(seeded_index(embedder.as_ref(), &corpus).await);

    let retrieval = RetrievalService::new(embedder, index, ", ");
    let first = retrieval.retrieve("docs", FRENCH_QUESTION, 2).await.unwrap();
    let second = retrieval.retrieve("docs", FRENCH_QUESTION, 2).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn upsert_with_mismatched_lengths_leaves_count_unchanged() {
    let index = InMemoryVectorIndex::new();
    index.create_collection("docs", 4).await.unwrap();

    let documents = Document::from_texts(["a", "b"]);
    let err = index.upsert("docs", &documents, &[vec![0.0; 4]]).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
    assert_eq!(index.count("docs").await.unwrap(), 0);
}

#[tokio::test]
async fn upsert_with_a_wrong_dimension_vector_writes_nothing() {
    let index = InMemoryVectorIndex::new();
    index.create_collection("docs", 4).await.unwrap();

    let documents = Document::from_texts(["a", "b"]);
    let vectors = vec![vec![0.0; 4], vec![0.0; 3]];
    let err = index.upsert("docs", &documents, &vectors).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 3 }));
    assert_eq!(index.count("docs").await.unwrap(), 0);
}

#[tokio::test]
async fn query_with_k_zero_is_an_invalid_argument() {
    let embedder = MockEmbedder::new(32);
    let corpus = Document::from_texts(["un"]);
    let index = seeded_index(&embedder, &corpus).await;

    let vector = embedder.embed("un").await.unwrap();
    let err = index.query("docs", &vector, 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn retrieving_from_an_empty_collection_fails_typed() {
    let embedder = Arc::new(MockEmbedder::new(32));
    let index = Arc::new(InMemoryVectorIndex::new());
    index.create_collection("docs", 32).await.unwrap();

    let retrieval = RetrievalService::new(embedder, index, ", ");
    let err = retrieval.retrieve("docs", "anything", 2).await.unwrap_err();
    assert!(matches!(err, RagError::EmptyCollection { .. }));
}

#[tokio::test]
async fn french_corpus_end_to_end() {
    let model = Arc::new(MockLanguageModel::new("Minou fait ses griffes sur le canapé."));
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::builder().collection("docs").top_k(2).model("llama3").build().unwrap())
        .embedding_provider(Arc::new(french_embedder()))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(model.clone())
        .build()
        .unwrap();

    let corpus = Document::from_texts(FRENCH_CORPUS);
    let answer = pipeline.run(&corpus, FRENCH_QUESTION).await.unwrap();

    assert!(!answer.is_empty());
    assert_eq!(
        model.last_prompt().as_deref(),
        Some(
            "Using this data: Minou fait ses griffes sur le canapé, Minou est un chat. \
             Answer this question: Que fait le chat ?"
        )
    );
}

#[tokio::test]
async fn rerunning_the_pipeline_resets_the_collection() {
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::default())
        .embedding_provider(Arc::new(french_embedder()))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(Arc::new(MockLanguageModel::new("ok")))
        .build()
        .unwrap();

    let corpus = Document::from_texts(FRENCH_CORPUS);
    pipeline.run(&corpus, FRENCH_QUESTION).await.unwrap();
    // A second run against the same collection name must not conflict
    // with, or accumulate onto, the first run's data.
    pipeline.run(&corpus, FRENCH_QUESTION).await.unwrap();
}

#[tokio::test]
async fn empty_corpus_aborts_at_the_retrieve_stage() {
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::default())
        .embedding_provider(Arc::new(MockEmbedder::new(8)))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(Arc::new(MockLanguageModel::new("ok")))
        .build()
        .unwrap();

    let err = pipeline.run(&[], "question").await.unwrap_err();
    match err {
        RagError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Retrieve);
            assert!(matches!(*source, RagError::EmptyCollection { .. }));
        }
        other => panic!("expected stage failure, got {other}"),
    }
}

#[tokio::test]
async fn embedding_failure_aborts_at_the_ingest_stage() {
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::default())
        .embedding_provider(Arc::new(FailingEmbedder))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(Arc::new(MockLanguageModel::new("ok")))
        .build()
        .unwrap();

    let corpus = Document::from_texts(["un"]);
    let err = pipeline.run(&corpus, "question").await.unwrap_err();
    match err {
        RagError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Ingest);
            assert!(matches!(*source, RagError::Embedding { .. }));
        }
        other => panic!("expected stage failure, got {other}"),
    }
}

#[tokio::test]
async fn generation_failure_aborts_at_the_generate_stage() {
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::default())
        .embedding_provider(Arc::new(french_embedder()))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .language_model(Arc::new(FailingModel))
        .build()
        .unwrap();

    let corpus = Document::from_texts(FRENCH_CORPUS);
    let err = pipeline.run(&corpus, FRENCH_QUESTION).await.unwrap_err();
    match err {
        RagError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Generate);
            assert!(matches!(*source, RagError::Generation { .. }));
        }
        other => panic!("expected stage failure, got {other}"),
    }
}
