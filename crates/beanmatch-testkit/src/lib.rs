//! Deterministic collaborators for exercising the search pipeline without a
//! model or an index on disk.

use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use beanmatch_core::error::{Error, Result};
use beanmatch_core::fuzzy::tokenize;
use beanmatch_core::traits::{CandidateSource, Embedder, TextIndexer, VectorIndexer};
use beanmatch_core::types::{Document, SearchHit, SourceKind};
use beanmatch_core::vector::normalize;

/// Concept dimensions: the ten flavor terms, then `earth`, then a catch-all.
const CONCEPTS: usize = 12;
const EARTH: usize = 10;
const MISC: usize = 11;

const LEXICON: &[(usize, &[&str])] = &[
    (0, &["sweet", "sweeter", "sweetness", "sugar", "honey", "caramel", "syrupy", "molasses"]),
    (1, &["bitter", "bitterness", "burnt", "harsh", "ashy"]),
    (2, &["acid", "acidity", "acidic", "tart", "bright", "crisp", "crisply", "tangy", "sour", "zesty"]),
    (3, &["smooth", "mellow", "velvety", "creamy", "silky", "round", "soft"]),
    (4, &["fruit", "fruity", "apple", "berry", "berries", "blueberry", "cherry", "plum", "peach", "grape"]),
    (5, &["nut", "nutty", "almond", "hazelnut", "peanut", "walnut", "pecan"]),
    (6, &["citrus", "lemon", "orange", "lime", "grapefruit", "bergamot", "tangerine"]),
    (7, &["chocolate", "chocolatey", "cocoa", "cacao", "mocha", "fudge"]),
    (8, &["floral", "jasmine", "flower", "flowers", "rose", "lavender", "blossom", "hibiscus"]),
    (9, &["wood", "woody", "cedar", "oak", "smoky", "tobacco", "pine"]),
    (EARTH, &["earthy", "earth", "spice", "spicy", "herbal", "soil", "mushroom"]),
];

fn concept_of(token: &str) -> Option<usize> {
    LEXICON
        .iter()
        .find(|(_, words)| words.contains(&token))
        .map(|(idx, _)| *idx)
}

/// Embeds text as a bag of tasting concepts: each known descriptor adds one
/// to its concept, unknown words land in a shared catch-all dimension.
/// Related descriptors ("tart", "crisp") therefore point the same way as
/// their flavor term ("acid"), which makes semantic ordering predictable.
#[derive(Default)]
pub struct ConceptEmbedder {
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl ConceptEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `embed_batch` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of individual texts embedded so far.
    pub fn texts_embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut v = vec![0f32; CONCEPTS];
        v[MISC] = 0.1;
        for token in tokenize(text) {
            match concept_of(&token) {
                Some(idx) => v[idx] += 1.0,
                None => v[MISC] += 1.0,
            }
        }
        normalize(&mut v);
        v
    }
}

impl Embedder for ConceptEmbedder {
    fn dim(&self) -> usize {
        CONCEPTS
    }

    fn max_len(&self) -> usize {
        512
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::embed_text(t)).collect())
    }
}

/// Embedder whose backend is unreachable, optionally after serving a number
/// of calls normally.
pub struct FailingEmbedder {
    dim: usize,
    healthy_calls: usize,
    served: AtomicUsize,
}

impl FailingEmbedder {
    /// Fails every call.
    pub fn new(dim: usize) -> Self {
        Self { dim, healthy_calls: 0, served: AtomicUsize::new(0) }
    }

    /// Answers the first `calls` calls like [`ConceptEmbedder`], then fails.
    pub fn after(calls: usize) -> Self {
        Self { dim: CONCEPTS, healthy_calls: calls, served: AtomicUsize::new(0) }
    }
}

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        512
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if self.served.fetch_add(1, Ordering::SeqCst) < self.healthy_calls {
            return Ok(texts.iter().map(|t| ConceptEmbedder::embed_text(t)).collect());
        }
        Err(anyhow!("embedding service unreachable"))
    }
}

/// Serves a fixed ranked list from every retrieval entry point and records
/// the `k` each call asked for.
pub struct StaticRetriever {
    hits: Vec<SearchHit>,
    requested: Mutex<Vec<usize>>,
}

impl StaticRetriever {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits, requested: Mutex::new(Vec::new()) }
    }

    /// Ranked list built from documents, scores descending from 1.0.
    pub fn from_docs(docs: Vec<Document>, source: SourceKind) -> Self {
        Self::new(ranked_hits(docs, source))
    }

    pub fn requested(&self) -> Vec<usize> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn top(&self, k: usize) -> Vec<SearchHit> {
        if let Ok(mut r) = self.requested.lock() {
            r.push(k);
        }
        self.hits.iter().take(k).cloned().collect()
    }
}

impl CandidateSource for StaticRetriever {
    fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<SearchHit>> {
        Ok(self.top(k))
    }

    fn retrieve_by_vector(&self, _query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        Ok(self.top(k))
    }
}

impl TextIndexer for StaticRetriever {
    fn index(&self, _docs: &[Document]) -> anyhow::Result<()> {
        Ok(())
    }

    fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.top(k))
    }
}

impl VectorIndexer for StaticRetriever {
    fn index(&self, _docs: &[Document], _embeddings: &[Vec<f32>]) -> anyhow::Result<()> {
        Ok(())
    }

    fn search_vec(&self, _query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.top(k))
    }
}

/// Every retrieval entry point fails.
pub struct FailingRetriever;

impl CandidateSource for FailingRetriever {
    fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<SearchHit>> {
        Err(Error::RetrievalFailure { retriever: SourceKind::Hybrid, message: "index offline".into() })
    }

    fn retrieve_by_vector(&self, _query_vec: &[f32], _k: usize) -> Result<Vec<SearchHit>> {
        Err(Error::RetrievalFailure { retriever: SourceKind::Vector, message: "index offline".into() })
    }
}

impl TextIndexer for FailingRetriever {
    fn index(&self, _docs: &[Document]) -> anyhow::Result<()> {
        Err(anyhow!("index offline"))
    }

    fn search(&self, _query: &str, _k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Err(anyhow!("index offline"))
    }
}

impl VectorIndexer for FailingRetriever {
    fn index(&self, _docs: &[Document], _embeddings: &[Vec<f32>]) -> anyhow::Result<()> {
        Err(anyhow!("index offline"))
    }

    fn search_vec(&self, _query_vec: &[f32], _k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Err(anyhow!("index offline"))
    }
}

pub fn doc(id: &str, text: &str) -> Document {
    Document::new(id, text)
}

pub fn bean(id: &str, text: &str, roast: &str) -> Document {
    Document::new(id, text).with_meta("roast", roast)
}

pub fn ranked_hits(docs: Vec<Document>, source: SourceKind) -> Vec<SearchHit> {
    let n = docs.len().max(1) as f32;
    docs.into_iter()
        .enumerate()
        .map(|(i, d)| SearchHit::new(d, 1.0 - i as f32 / n, source))
        .collect()
}

pub fn ids<T: AsRef<Document>>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.as_ref().id.clone()).collect()
}

/// A small catalog spanning the five taste axes.
pub fn sample_catalog() -> Vec<Document> {
    vec![
        bean("ethiopia-yirgacheffe", "Bright and floral with jasmine, lemon and bergamot notes.", "Light"),
        bean("kenya-aa", "Crisp, tart blackcurrant and grapefruit acidity with a juicy berry finish.", "Light"),
        bean("colombia-huila", "Sweet caramel and red apple with a balanced, round body.", "Medium"),
        bean("brazil-santos", "Smooth and nutty with almond, peanut and milk chocolate.", "Medium"),
        bean("sumatra-mandheling", "Earthy, woody and smoky with cedar, tobacco and dark cocoa.", "Dark"),
        bean("italian-espresso", "Bitter dark chocolate and burnt sugar, heavy and smoky.", "Dark"),
        bean("guatemala-antigua", "Velvety cocoa and hazelnut with mellow spice.", "Medium"),
        bean("costa-rica-tarrazu", "Clean citrus, honey sweetness and orange blossom.", "Light"),
    ]
}
