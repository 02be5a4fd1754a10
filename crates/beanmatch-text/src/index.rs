use anyhow::{anyhow, Result};
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, ReloadPolicy, TantivyDocument};
use tracing::{debug, info};

use beanmatch_core::traits::TextIndexer;
use beanmatch_core::types::{Document, Meta, SearchHit, SourceKind};

use crate::query::build_fuzzy_query;
use crate::tantivy_utils::{analyze, build_schema, register_tokenizer};

const WRITER_HEAP: usize = 50_000_000;

pub struct TantivyIndexer {
    index: Index,
    reader: IndexReader,
    id_field: Field,
    text_field: Field,
    metadata_field: Field,
}

impl TantivyIndexer {
    /// Fresh index at `index_dir`, replacing whatever was there.
    pub fn create(index_dir: &Path) -> Result<Self> {
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)?;
        }
        std::fs::create_dir_all(index_dir)?;
        Self::from_index(Index::create_in_dir(index_dir, build_schema())?)
    }

    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| anyhow!("Failed to open tantivy index at {}: {}", index_dir.display(), e))?;
        Self::from_index(index)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_index(Index::create_in_ram(build_schema()))
    }

    fn from_index(index: Index) -> Result<Self> {
        register_tokenizer(&index);
        let schema = index.schema();
        let id_field = schema.get_field("id")?;
        let text_field = schema.get_field("text")?;
        let metadata_field = schema.get_field("metadata")?;
        let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
        Ok(Self { index, reader, id_field, text_field, metadata_field })
    }

    fn to_document(&self, doc: &TantivyDocument) -> Result<Document> {
        let field_str = |field: Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
        let metadata_json = field_str(self.metadata_field);
        let metadata: Meta = if metadata_json.is_empty() { Meta::new() } else { serde_json::from_str(&metadata_json)? };
        Ok(Document { id: field_str(self.id_field), text: field_str(self.text_field), metadata })
    }
}

impl TextIndexer for TantivyIndexer {
    fn index(&self, docs: &[Document]) -> anyhow::Result<()> {
        let mut index_writer = self.index.writer(WRITER_HEAP)?;
        for d in docs {
            index_writer.add_document(doc!(
                self.id_field => d.id.clone(),
                self.text_field => d.text.clone(),
                self.metadata_field => serde_json::to_string(&d.metadata)?,
            ))?;
        }
        index_writer.commit()?;
        self.reader.reload()?;
        info!(docs = docs.len(), "tantivy index committed");
        Ok(())
    }

    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        let terms = analyze(query);
        let Some(q) = build_fuzzy_query(self.text_field, &terms) else {
            debug!(query, "no searchable terms");
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            hits.push(SearchHit::new(self.to_document(&doc)?, score, SourceKind::Text));
        }
        debug!(query, terms = terms.len(), hits = hits.len(), "lexical search");
        Ok(hits)
    }
}
