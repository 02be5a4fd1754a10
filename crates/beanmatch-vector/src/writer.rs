use anyhow::{anyhow, ensure, Result};
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

use beanmatch_core::types::Document;

use crate::schema::build_arrow_schema;

const BATCH_SIZE: usize = 1000;

/// A LanceDB table of embedded documents.
///
/// The table API is async; this type owns a runtime and blocks on it so it
/// can back the synchronous [`beanmatch_core::traits::VectorIndexer`]. Do not
/// call it from inside another tokio runtime.
pub struct LanceVectorIndex {
    pub(crate) rt: Runtime,
    pub(crate) db: Connection,
    pub(crate) table_name: String,
    pub(crate) dim: usize,
}

impl LanceVectorIndex {
    /// Opens (or starts) the database at `db_path`.
    pub fn open(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let rt = Runtime::new()?;
        let uri = db_path.to_string_lossy().to_string();
        let db = rt.block_on(async { connect(&uri).execute().await })?;
        Ok(Self { rt, db, table_name: table_name.to_string(), dim })
    }

    /// Like [`open`](Self::open) but wipes any existing database first.
    pub fn create(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        if db_path.exists() {
            std::fs::remove_dir_all(db_path)?;
        }
        std::fs::create_dir_all(db_path)?;
        Self::open(db_path, table_name, dim)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) async fn table_exists(&self) -> Result<bool> {
        Ok(self.db.table_names().execute().await?.contains(&self.table_name))
    }

    pub(crate) async fn write(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> Result<()> {
        ensure!(docs.len() == embeddings.len(), "{} documents but {} embeddings", docs.len(), embeddings.len());
        if docs.is_empty() {
            return Ok(());
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dim) {
            return Err(anyhow!("expected {}-dim embeddings, got {}", self.dim, bad.len()));
        }

        let pb = ProgressBar::new(docs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} beans {msg}")?
                .progress_chars("#>-"),
        );
        for (doc_batch, emb_batch) in docs.chunks(BATCH_SIZE).zip(embeddings.chunks(BATCH_SIZE)) {
            self.insert_batch(doc_batch, emb_batch).await?;
            pb.inc(doc_batch.len() as u64);
        }
        pb.finish_with_message("done");
        info!(docs = docs.len(), table = %self.table_name, "lancedb table written");
        Ok(())
    }

    async fn insert_batch(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> Result<()> {
        let record_batch = self.to_record_batch(docs, embeddings)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if self.table_exists().await? {
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }

    fn to_record_batch(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
        let ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let metadata = docs
            .iter()
            .map(|d| serde_json::to_string(&d.metadata))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let vectors = embeddings.iter().map(|e| Some(e.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
        let record_batch = RecordBatch::try_new(
            build_arrow_schema(self.dim as i32),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(texts)),
                Arc::new(StringArray::from(metadata)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, self.dim as i32)),
            ],
        )?;
        Ok(record_batch)
    }
}
