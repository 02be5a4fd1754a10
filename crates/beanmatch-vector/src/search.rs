use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;
use tracing::debug;

use beanmatch_core::traits::VectorIndexer;
use beanmatch_core::types::{Document, Meta, SearchHit, SourceKind};

use crate::writer::LanceVectorIndex;

impl LanceVectorIndex {
    async fn nearest(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if query_vec.len() != self.dim {
            return Err(anyhow!("query has {} dims, table expects {}", query_vec.len(), self.dim));
        }
        if !self.table_exists().await? {
            return Err(anyhow!("table '{}' does not exist; run ingest first", self.table_name));
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_vec.to_vec())?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            hits.extend(batch_to_hits(&batch)?);
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(k, hits = hits.len(), "lancedb vector search");
        Ok(hits)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("column '{name}' missing or not utf8"))
}

/// Score is `1 - cosine distance`, i.e. the cosine similarity.
fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<SearchHit>> {
    let ids = string_column(batch, "id")?;
    let texts = string_column(batch, "text")?;
    let metadata = string_column(batch, "metadata")?;
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| anyhow!("search result has no _distance column"))?;

    let mut hits = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let meta: Meta = if metadata.is_null(i) { Meta::new() } else { serde_json::from_str(metadata.value(i))? };
        let document = Document { id: ids.value(i).to_string(), text: texts.value(i).to_string(), metadata: meta };
        hits.push(SearchHit::new(document, 1.0 - distances.value(i), SourceKind::Vector));
    }
    Ok(hits)
}

impl VectorIndexer for LanceVectorIndex {
    fn index(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> anyhow::Result<()> {
        self.rt.block_on(self.write(docs, embeddings))
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.rt.block_on(self.nearest(query_vec, k))
    }
}
