//! In-process backend double with naive score fusion.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use ragdoc_core::{
    IndexedRecord, LexicalClause, RagdocError, Result, SearchBackend, SearchHit, VectorClause,
};

/// In-memory backend for tests.
///
/// Fuses the two sub-queries the way the real engine would in spirit:
/// lexical score is the boost-weighted count of query terms occurring in the
/// record text, vector score is the boost-weighted cosine similarity, and the
/// hit score is their sum. Hits come back sorted by descending score.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<BTreeMap<String, IndexedRecord>>,
    created: AtomicBool,
    fail_writes: AtomicBool,
    upserts: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether the backend holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total writes received, including overwrites.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Fetch a stored record by id.
    pub fn record(&self, id: &str) -> Option<IndexedRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn create_collection(&self) -> Result<()> {
        if self.created.swap(true, Ordering::SeqCst) {
            return Err(RagdocError::CollectionExists {
                name: "memory".to_string(),
            });
        }
        Ok(())
    }

    async fn upsert(&self, id: &str, record: &IndexedRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RagdocError::backend_write("simulated write failure"));
        }

        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn query(
        &self,
        lexical: &LexicalClause,
        vector: &VectorClause,
        size: usize,
    ) -> Result<Vec<SearchHit>> {
        let terms: Vec<String> = lexical
            .query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();

        let records = self.records.lock().unwrap();
        let mut hits: Vec<SearchHit> = records
            .iter()
            .map(|(id, record)| {
                let text = record.text.to_lowercase();
                let matched = terms.iter().filter(|t| text.contains(t.as_str())).count();
                let lexical_score = lexical.boost * matched as f32;
                let vector_score = vector.boost * cosine(&vector.vector, &record.embed);
                SearchHit {
                    id: id.clone(),
                    score: lexical_score + vector_score,
                    text: record.text.clone(),
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(size);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdoc_core::{EMBED_FIELD, TEXT_FIELD};

    fn record(name: &str, text: &str, embed: Vec<f32>) -> IndexedRecord {
        IndexedRecord {
            name: name.to_string(),
            text: text.to_string(),
            lemma: text.to_lowercase(),
            embed,
        }
    }

    fn clauses(query: &str, vector: Vec<f32>) -> (LexicalClause, VectorClause) {
        (
            LexicalClause {
                field: TEXT_FIELD,
                query: query.to_string(),
                boost: 1.0,
            },
            VectorClause {
                field: EMBED_FIELD,
                vector,
                k: 10,
                num_candidates: 10_000,
                boost: 1.2,
            },
        )
    }

    #[tokio::test]
    async fn test_create_collection_once() {
        let backend = MemoryBackend::new();
        backend.create_collection().await.unwrap();

        let err = backend.create_collection().await.unwrap_err();
        assert!(matches!(err, RagdocError::CollectionExists { .. }));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_id() {
        let backend = MemoryBackend::new();
        backend
            .upsert("a-0", &record("a-0", "first", vec![1.0, 0.0]))
            .await
            .unwrap();
        backend
            .upsert("a-0", &record("a-0", "second", vec![0.0, 1.0]))
            .await
            .unwrap();

        assert_eq!(backend.len(), 1);
        assert_eq!(backend.upsert_count(), 2);
        assert_eq!(backend.record("a-0").unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_query_ranks_by_fused_score() {
        let backend = MemoryBackend::new();
        backend
            .upsert("a-0", &record("a-0", "Cats sleep often.", vec![1.0, 0.0]))
            .await
            .unwrap();
        backend
            .upsert("b-0", &record("b-0", "Tax forms due.", vec![0.0, 1.0]))
            .await
            .unwrap();

        let (lexical, vector) = clauses("cat sleep", vec![1.0, 0.0]);
        let hits = backend.query(&lexical, &vector, 10).await.unwrap();

        assert_eq!(hits[0].id, "a-0");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_query_respects_size() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            let id = format!("doc-{}", i);
            backend
                .upsert(&id, &record(&id, "same text", vec![1.0]))
                .await
                .unwrap();
        }

        let (lexical, vector) = clauses("same", vec![1.0]);
        let hits = backend.query(&lexical, &vector, 3).await.unwrap();
        assert_eq!(hits.len(), 3);
    }
}
