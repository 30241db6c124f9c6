//! HTTP clients for a locally hosted Ollama runtime.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use askdocs_core::{AskdocsError, Embedder, Generator, Result, TokenStream};

/// Request body for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f64>,
}

/// Request body for the generate endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One NDJSON line from the streaming generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Embedding client over Ollama's `/api/embeddings` endpoint.
///
/// The same endpoint is used for documents and queries so both land in a
/// comparable vector space.
pub struct OllamaEmbedder {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new embedder for the given runtime URL and model tag.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AskdocsError::embedding(format!("Failed to build HTTP client: {}", e)))?;

        info!("Embedding model: {}", model);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AskdocsError::embedding(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AskdocsError::embedding(format!("Ollama returned an error: {}", e)))?;

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AskdocsError::embedding(format!("Invalid response body: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(AskdocsError::embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model
            )));
        }

        debug!("Embedded {} chars into {} dims", text.len(), parsed.embedding.len());

        Ok(parsed.embedding.into_iter().map(|v| v as f32).collect())
    }
}

/// Generation client over Ollama's `/api/generate` endpoint.
///
/// Responses are requested as a stream; tokens are parsed out of the NDJSON
/// body line by line and yielded as they arrive.
pub struct OllamaGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a new generator for the given runtime URL and model tag.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AskdocsError::generation(format!("Failed to build HTTP client: {}", e)))?;

        info!("Language model: {}", model);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AskdocsError::generation(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AskdocsError::generation(format!("Ollama returned an error: {}", e)))?;

        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buf: Vec<u8> = Vec::new();

            'body: while let Some(chunk) = bytes.next().await {
                let chunk = chunk
                    .map_err(|e| AskdocsError::generation(format!("Stream error: {}", e)))?;
                buf.extend_from_slice(&chunk);

                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = &line[..line.len() - 1];
                    if line.is_empty() {
                        continue;
                    }

                    let parsed: GenerateChunk = serde_json::from_slice(line).map_err(|e| {
                        AskdocsError::generation(format!("Invalid stream line: {}", e))
                    })?;

                    if !parsed.response.is_empty() {
                        yield parsed.response;
                    }
                    if parsed.done {
                        break 'body;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let embedder = OllamaEmbedder::new(
            "http://localhost:11434/",
            "nomic-embed-text:137m-v1.5-fp16",
            Duration::from_secs(120),
        )
        .unwrap();
        assert_eq!(embedder.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_generate_chunk_parsing() {
        let chunk: GenerateChunk =
            serde_json::from_str(r#"{"response":"Hello","done":false}"#).unwrap();
        assert_eq!(chunk.response, "Hello");
        assert!(!chunk.done);

        // Final line carries done plus timing fields we ignore
        let last: GenerateChunk =
            serde_json::from_str(r#"{"response":"","done":true,"total_duration":12345}"#).unwrap();
        assert!(last.done);
    }
}
