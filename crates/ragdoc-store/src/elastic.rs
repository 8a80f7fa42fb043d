//! HTTP client for an Elasticsearch-compatible search engine.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragdoc_core::{
    IndexedRecord, LexicalClause, RagdocError, Result, SearchBackend, SearchHit, StorageConfig,
    VectorClause, TEXT_FIELD,
};

use crate::schema::CreateCollectionBody;

/// Client for the storage backend.
///
/// Holds one `reqwest::Client`; constructed once at startup and shared.
/// Score fusion of the two sub-queries happens engine-side; the client only
/// deserializes the ranked hits.
pub struct ElasticBackend {
    http: reqwest::Client,
    base_url: String,
    collection: String,
    dims: usize,
}

impl ElasticBackend {
    /// Create a backend client for `config.collection`, with record vectors
    /// of `dims` components.
    pub fn new(config: &StorageConfig, dims: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url(),
            collection: config.collection.clone(),
            dims,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    /// Delete the collection. An absent collection is a success.
    pub async fn delete_collection(&self) -> Result<()> {
        let resp = self
            .http
            .delete(self.collection_url())
            .send()
            .await
            .map_err(|e| RagdocError::schema(e.to_string()))?;

        if resp.status().is_success() || resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(RagdocError::schema(format!(
            "delete collection returned {}",
            resp.status()
        )))
    }

    /// Fetch collection metadata (mappings and settings) as reported by the
    /// engine.
    pub async fn collection_info(&self) -> Result<serde_json::Value> {
        let resp = self
            .http
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| RagdocError::backend_query(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::backend_query(format!(
                "collection info returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| RagdocError::backend_query(e.to_string()))
    }

    async fn error_kind(resp: reqwest::Response) -> (Option<String>, Option<String>) {
        match resp.json::<ErrorEnvelope>().await {
            Ok(envelope) => (Some(envelope.error.kind), envelope.error.reason),
            Err(_) => (None, None),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,

    reason: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    size: usize,

    #[serde(rename = "_source")]
    source: [&'a str; 1],

    query: QueryClause<'a>,

    knn: KnnClause<'a>,
}

#[derive(Serialize)]
struct QueryClause<'a> {
    #[serde(rename = "match")]
    match_: HashMap<&'a str, MatchParams<'a>>,
}

#[derive(Serialize)]
struct MatchParams<'a> {
    query: &'a str,
    boost: f32,
}

#[derive(Serialize)]
struct KnnClause<'a> {
    field: &'a str,
    query_vector: &'a [f32],
    k: usize,
    num_candidates: usize,
    boost: f32,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,

    #[serde(rename = "_score")]
    score: Option<f32>,

    #[serde(rename = "_source", default)]
    source: HitSource,
}

#[derive(Deserialize, Default)]
struct HitSource {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn create_collection(&self) -> Result<()> {
        let resp = self
            .http
            .put(self.collection_url())
            .json(&CreateCollectionBody::new(self.dims))
            .send()
            .await
            .map_err(|e| RagdocError::schema(e.to_string()))?;

        if resp.status().is_success() {
            debug!(collection = %self.collection, "created collection");
            return Ok(());
        }

        let status = resp.status();
        match Self::error_kind(resp).await {
            (Some(kind), _) if kind == "resource_already_exists_exception" => {
                Err(RagdocError::CollectionExists {
                    name: self.collection.clone(),
                })
            }
            (kind, reason) => Err(RagdocError::schema(
                reason
                    .or(kind)
                    .unwrap_or_else(|| format!("create collection returned {}", status)),
            )),
        }
    }

    async fn upsert(&self, id: &str, record: &IndexedRecord) -> Result<()> {
        let resp = self
            .http
            .put(format!("{}/_doc/{}", self.collection_url(), id))
            .json(record)
            .send()
            .await
            .map_err(|e| RagdocError::backend_write(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::backend_write(format!(
                "upsert of {} returned {}",
                id,
                resp.status()
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        lexical: &LexicalClause,
        vector: &VectorClause,
        size: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut match_ = HashMap::new();
        match_.insert(
            lexical.field,
            MatchParams {
                query: &lexical.query,
                boost: lexical.boost,
            },
        );

        let body = SearchRequest {
            size,
            source: [TEXT_FIELD],
            query: QueryClause { match_ },
            knn: KnnClause {
                field: vector.field,
                query_vector: &vector.vector,
                k: vector.k,
                num_candidates: vector.num_candidates,
                boost: vector.boost,
            },
        };

        let resp = self
            .http
            .post(format!("{}/_search", self.collection_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| RagdocError::backend_query(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::backend_query(format!(
                "search returned {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| RagdocError::backend_query(e.to_string()))?;

        let hits = body
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                id: hit.id,
                score: hit.score.unwrap_or(0.0),
                text: hit.source.text,
            })
            .collect::<Vec<_>>();

        debug!(hits = hits.len(), "hybrid query returned");

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn backend_for(server: &MockServer) -> ElasticBackend {
        let config = StorageConfig {
            host: server.host(),
            port: server.port(),
            collection: "ragdoc".to_string(),
        };
        ElasticBackend::new(&config, 3)
    }

    #[tokio::test]
    async fn test_create_collection_sends_schema() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/ragdoc")
                    .json_body_partial(
                        r#"{"mappings": {"properties": {"embed": {"type": "dense_vector", "dims": 3}}}}"#,
                    );
                then.status(200)
                    .json_body(serde_json::json!({ "acknowledged": true }));
            })
            .await;

        let backend = backend_for(&server);
        backend.create_collection().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_collection_already_exists() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/ragdoc");
                then.status(400).json_body(serde_json::json!({
                    "error": {
                        "type": "resource_already_exists_exception",
                        "reason": "index [ragdoc] already exists"
                    },
                    "status": 400
                }));
            })
            .await;

        let backend = backend_for(&server);
        let err = backend.create_collection().await.unwrap_err();
        assert!(matches!(err, RagdocError::CollectionExists { .. }));
    }

    #[tokio::test]
    async fn test_create_collection_other_failure_is_schema_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/ragdoc");
                then.status(400).json_body(serde_json::json!({
                    "error": {
                        "type": "mapper_parsing_exception",
                        "reason": "bad mapping"
                    },
                    "status": 400
                }));
            })
            .await;

        let backend = backend_for(&server);
        let err = backend.create_collection().await.unwrap_err();
        match err {
            RagdocError::Schema { message } => assert!(message.contains("bad mapping")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upsert_puts_record_under_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/ragdoc/_doc/a.txt-0")
                    .json_body_partial(r#"{"name": "a.txt-0", "lemma": "cat sleep often"}"#);
                then.status(201)
                    .json_body(serde_json::json!({ "result": "created" }));
            })
            .await;

        let backend = backend_for(&server);
        let record = IndexedRecord {
            name: "a.txt-0".to_string(),
            text: "Cats sleep often.".to_string(),
            lemma: "cat sleep often".to_string(),
            embed: vec![0.1, 0.2, 0.3],
        };
        backend.upsert("a.txt-0", &record).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_parses_ranked_hits() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/ragdoc/_search")
                    .json_body_partial(
                        r#"{"size": 5, "knn": {"field": "embed", "k": 10, "num_candidates": 10000}}"#,
                    );
                then.status(200).json_body(serde_json::json!({
                    "hits": {
                        "hits": [
                            { "_id": "a.txt-0", "_score": 7.5, "_source": { "text": "Cats sleep often." } },
                            { "_id": "b.txt-2", "_score": 3.1, "_source": { "text": "Dogs bark." } }
                        ]
                    }
                }));
            })
            .await;

        let backend = backend_for(&server);
        let lexical = LexicalClause {
            field: TEXT_FIELD,
            query: "cat sleep".to_string(),
            boost: 1.0,
        };
        let vector = VectorClause {
            field: "embed",
            vector: vec![0.1, 0.2, 0.3],
            k: 10,
            num_candidates: 10_000,
            boost: 1.2,
        };

        let hits = backend.query(&lexical, &vector, 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a.txt-0");
        assert_eq!(hits[0].score, 7.5);
        assert_eq!(hits[1].text, "Dogs bark.");
    }

    #[tokio::test]
    async fn test_query_failure_is_backend_query_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/ragdoc/_search");
                then.status(503);
            })
            .await;

        let backend = backend_for(&server);
        let lexical = LexicalClause {
            field: TEXT_FIELD,
            query: "anything".to_string(),
            boost: 1.0,
        };
        let vector = VectorClause {
            field: "embed",
            vector: vec![0.0, 0.0, 0.0],
            k: 10,
            num_candidates: 10_000,
            boost: 1.2,
        };

        let err = backend.query(&lexical, &vector, 5).await.unwrap_err();
        assert!(matches!(err, RagdocError::BackendQueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_delete_absent_collection_is_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/ragdoc");
                then.status(404).json_body(serde_json::json!({
                    "error": { "type": "index_not_found_exception", "reason": "no such index" },
                    "status": 404
                }));
            })
            .await;

        let backend = backend_for(&server);
        backend.delete_collection().await.unwrap();
    }
}
