//! Per-video vector index: in-memory similarity search and durable storage.

mod store;

pub use store::{IndexStore, IndexSummary};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One indexed chunk: the embedding and the text it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Text content of the chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of the chunk in the transcript.
    pub order: usize,
}

/// A retrieval hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched passage.
    pub content: String,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// In-memory similarity-searchable index for one video.
///
/// Built once on the load path, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Video ID this index belongs to.
    pub video_id: String,
    /// Embedding model the vectors were produced with.
    pub embedding_model: String,
    /// Embedding dimensions.
    pub dimensions: usize,
    /// When the index was built.
    pub created_at: DateTime<Utc>,
    /// Indexed entries, in chunk order.
    pub entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from embedded chunks.
    pub fn build(
        video_id: impl Into<String>,
        embedding_model: impl Into<String>,
        dimensions: usize,
        entries: Vec<IndexEntry>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            embedding_model: embedding_model.into(),
            dimensions,
            created_at: Utc::now(),
            entries,
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` passages most similar to the query vector, best match
    /// first.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                content: entry.content.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        hits
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str, embedding: Vec<f32>, order: usize) -> IndexEntry {
        IndexEntry {
            content: content.to_string(),
            embedding,
            order,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_search_orders_by_descending_similarity() {
        let index = VectorIndex::build(
            "video1",
            "test-model",
            3,
            vec![
                entry("far", vec![0.0, 1.0, 0.0], 0),
                entry("near", vec![1.0, 0.0, 0.0], 1),
                entry("middle", vec![0.7, 0.7, 0.0], 2),
            ],
        );

        let hits = index.search(&[1.0, 0.0, 0.0], 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].content, "near");
        assert_eq!(hits[1].content, "middle");
        assert_eq!(hits[2].content, "far");
        assert!(hits[0].score >= hits[1].score);
        assert!(hits[1].score >= hits[2].score);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let entries = (0..10)
            .map(|i| entry(&format!("chunk {}", i), vec![1.0, i as f32], i))
            .collect();
        let index = VectorIndex::build("video1", "test-model", 2, entries);

        let hits = index.search(&[1.0, 0.0], 4);
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_search_with_fewer_entries_than_k() {
        let index = VectorIndex::build(
            "video1",
            "test-model",
            2,
            vec![entry("only", vec![1.0, 0.0], 0)],
        );

        let hits = index.search(&[1.0, 0.0], 4);
        assert_eq!(hits.len(), 1);
    }
}
