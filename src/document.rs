//! Data types for documents and ranked retrieval matches.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A corpus document: a unit of text addressable by a stable id.
///
/// Ids are unique within a collection and stable across the collection's
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }

    /// Build documents from an ordered sequence of texts, minting the
    /// zero-based position as each document's id.
    pub fn from_texts<I, S>(texts: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Document::new(i.to_string(), text))
            .collect()
    }
}

/// A retrieved [`Document`] paired with its distance to the query vector.
///
/// Distance is per the collection's similarity metric (cosine distance
/// for the built-in backends): lower is more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    /// The retrieved document.
    pub document: Document,
    /// Distance to the query vector (lower = more similar).
    pub distance: f32,
}

impl RankedMatch {
    /// The ordering index backends use to rank matches: ascending
    /// distance, ties broken by ascending document id so that query
    /// results are reproducible.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.document.id.cmp(&other.document.id))
    }
}
