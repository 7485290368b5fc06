use std::cmp::Ordering;
use std::sync::Arc;

use super::embedding::EmbeddingService;
use super::types::{EnrichedRecord, SearchResult};

/// Ranks enriched records against a text query by cosine similarity.
/// Read-only over the collection; scores live on the returned copies.
pub struct SearchService {
    embedding: Arc<EmbeddingService>,
}

impl SearchService {
    pub fn new(embedding: Arc<EmbeddingService>) -> Self {
        Self { embedding }
    }

    pub async fn search(
        &self,
        query: &str,
        records: &[EnrichedRecord],
        top_k: usize,
        threshold: f32,
    ) -> Vec<SearchResult> {
        if records.is_empty() {
            return Vec::new();
        }

        let query_vector = self.embedding.embed(query).await;
        let results = rank(&query_vector, records, top_k, threshold);
        tracing::debug!(query, results = results.len(), "search complete");
        results
    }
}

fn rank(
    query: &[f32],
    records: &[EnrichedRecord],
    top_k: usize,
    threshold: f32,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = records
        .iter()
        .map(|record| SearchResult {
            score: cosine_similarity(query, &record.embedding),
            record: record.clone(),
        })
        .filter(|result| result.score > threshold)
        .collect();

    // Stable sort: equal scores keep collection order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(top_k);
    results
}

/// Defined as 0 when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::ai::test_support::FixedEmbedder;
    use crate::services::ai::types::Record;

    fn record_with(name: &str, embedding: Vec<f32>) -> EnrichedRecord {
        EnrichedRecord {
            record: Record {
                company_name: Some(name.to_string()),
                ..Default::default()
            },
            enrichment: None,
            searchable_text: name.to_string(),
            embedding,
        }
    }

    #[test]
    fn cosine_handles_identical_orthogonal_and_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn ranks_by_similarity_and_excludes_zero_vectors() {
        let query = [1.0, 0.0];
        let records = vec![
            record_with("a", vec![1.0, 0.0]),
            record_with("b", vec![1.0, 1.0]),
            record_with("c", vec![0.0, 0.0]),
        ];

        let results = rank(&query, &records, 2, 0.3);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.record.company_name.as_deref(), Some("a"));
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].record.record.company_name.as_deref(), Some("b"));
        assert!((results[1].score - 0.7071).abs() < 1e-3);
    }

    #[test]
    fn zero_vector_excluded_for_any_nonnegative_threshold() {
        let query = [1.0, 0.0];
        let records = vec![record_with("zero", vec![0.0, 0.0])];
        assert!(rank(&query, &records, 10, 0.0).is_empty());
        assert!(rank(&query, &records, 10, 0.9).is_empty());
    }

    #[test]
    fn raising_threshold_never_grows_result_count() {
        let query = [1.0, 0.0];
        let records = vec![
            record_with("a", vec![1.0, 0.0]),
            record_with("b", vec![1.0, 1.0]),
            record_with("c", vec![1.0, 4.0]),
        ];

        let mut previous = usize::MAX;
        for threshold in [0.0, 0.2, 0.5, 0.8, 0.99] {
            let count = rank(&query, &records, 10, threshold).len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn result_count_bounded_by_top_k_and_collection() {
        let query = [1.0, 0.0];
        let records: Vec<EnrichedRecord> = (0..5)
            .map(|i| record_with(&format!("r{i}"), vec![1.0, 0.0]))
            .collect();

        assert_eq!(rank(&query, &records, 3, 0.3).len(), 3);
        assert_eq!(rank(&query, &records, 50, 0.3).len(), 5);
    }

    #[test]
    fn equal_scores_keep_collection_order() {
        let query = [1.0, 0.0];
        let records = vec![
            record_with("first", vec![2.0, 0.0]),
            record_with("second", vec![5.0, 0.0]),
        ];

        let results = rank(&query, &records, 10, 0.3);
        assert_eq!(results[0].record.record.company_name.as_deref(), Some("first"));
        assert_eq!(results[1].record.record.company_name.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn empty_collection_returns_empty() {
        let embedding = Arc::new(EmbeddingService::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            2,
        ));
        let service = SearchService::new(embedding);

        let results = service.search("בתי ספר", &[], 10, 0.3).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_embeds_query_and_ranks() {
        let embedding = Arc::new(EmbeddingService::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            2,
        ));
        let service = SearchService::new(embedding);
        let records = vec![
            record_with("a", vec![1.0, 0.0]),
            record_with("b", vec![0.0, 1.0]),
        ];

        let results = service.search("בתי ספר", &records, 10, 0.3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.record.company_name.as_deref(), Some("a"));
    }
}
