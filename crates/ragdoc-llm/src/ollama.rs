//! HTTP gateway client for an Ollama-compatible model server.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ragdoc_core::{
    EmbeddingGateway, EventStream, GatewayConfig, Generation, GenerationGateway,
    GenerationOptions, RagdocError, Result, StreamEvent,
};

/// Client for the embedding/generation gateway.
///
/// Holds one `reqwest::Client`; constructed once at startup and shared.
pub struct OllamaGateway {
    http: reqwest::Client,
    base_url: String,
    model: String,
    embed_dims: usize,
    options: GenerationOptions,
}

impl OllamaGateway {
    /// Create a gateway client from configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url(),
            model: config.model.clone(),
            embed_dims: config.embed_dims,
            options: config.options.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn generate_body<'a>(&'a self, prompt: &'a str, stream: bool) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream,
            options: OptionsBody {
                temperature: self.options.temperature,
                num_ctx: self.options.num_ctx,
                num_predict: self.options.num_predict,
            },
        }
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OptionsBody,
}

#[derive(Serialize)]
struct OptionsBody {
    temperature: f32,
    num_ctx: u32,
    num_predict: u32,
}

/// One generation response body; in streaming mode, one NDJSON line.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,

    #[serde(default)]
    done: bool,

    prompt_eval_count: Option<u64>,

    eval_count: Option<u64>,

    eval_duration: Option<u64>,
}

#[async_trait]
impl EmbeddingGateway for OllamaGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(RagdocError::invalid_argument("text must not be empty"));
        }

        debug!(chars = text.len(), "requesting embedding");

        let resp = self
            .http
            .post(self.endpoint("/api/embeddings"))
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| RagdocError::gateway(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::gateway(format!(
                "embeddings request returned {}",
                resp.status()
            )));
        }

        let body: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| RagdocError::gateway(e.to_string()))?;

        Ok(body.embedding)
    }

    fn dimension(&self) -> usize {
        self.embed_dims
    }
}

#[async_trait]
impl GenerationGateway for OllamaGateway {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        if prompt.is_empty() {
            return Err(RagdocError::invalid_argument("prompt must not be empty"));
        }

        let resp = self
            .http
            .post(self.endpoint("/api/generate"))
            .json(&self.generate_body(prompt, false))
            .send()
            .await
            .map_err(|e| RagdocError::gateway(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::gateway(format!(
                "generate request returned {}",
                resp.status()
            )));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| RagdocError::gateway(e.to_string()))?;

        Ok(Generation {
            response: body.response,
            prompt_tokens: body.prompt_eval_count,
            response_tokens: body.eval_count,
            duration_ns: body.eval_duration,
        })
    }

    async fn stream(&self, prompt: &str) -> Result<EventStream<'static>> {
        if prompt.is_empty() {
            return Err(RagdocError::invalid_argument("prompt must not be empty"));
        }

        let resp = self
            .http
            .post(self.endpoint("/api/generate"))
            .json(&self.generate_body(prompt, true))
            .send()
            .await
            .map_err(|e| RagdocError::gateway(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RagdocError::gateway(format!(
                "generate request returned {}",
                resp.status()
            )));
        }

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();

        let events = stream::unfold(NdjsonDecoder::new(body), |mut decoder| async move {
            decoder.next_event().await.map(|event| (event, decoder))
        });

        Ok(events.boxed())
    }
}

/// Incremental NDJSON decoder over the response byte stream.
///
/// Emits one event per line and stops after the done event; trailing bytes
/// are ignored.
struct NdjsonDecoder {
    inner: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buf: Vec<u8>,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

impl NdjsonDecoder {
    fn new(inner: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    async fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if matches!(event, StreamEvent::Done { .. }) {
                    self.finished = true;
                }
                return Some(Ok(event));
            }

            if self.finished {
                return None;
            }

            match self.inner.next().await {
                Some(Ok(bytes)) => {
                    self.buf.extend_from_slice(&bytes);
                    self.drain_lines();
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(RagdocError::gateway(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<GenerateResponse>(line) {
                Ok(body) if body.done => {
                    self.pending.push_back(StreamEvent::Done {
                        prompt_tokens: body.prompt_eval_count,
                        response_tokens: body.eval_count,
                    });
                }
                Ok(body) => {
                    self.pending.push_back(StreamEvent::Token(body.response));
                }
                Err(e) => {
                    warn!("skipping malformed stream line: {}", e);
                }
            }
        }
    }
}
