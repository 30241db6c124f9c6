//! Deterministic mock providers for testing without a running model runtime.

use async_trait::async_trait;
use futures_util::stream;

use askdocs_core::{AskdocsError, Embedder, Generator, Result, TokenStream};

/// A mock embedder using word-level feature hashing.
///
/// Texts sharing words produce similar vectors, so retrieval ordering in
/// tests behaves like a real embedding model would.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the default dimension.
    pub fn new() -> Self {
        Self { dimension: 64 }
    }

    /// Create a mock embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_word(word: &str) -> u64 {
        // FNV-1a
        let mut h: u64 = 0xcbf29ce484222325;
        for b in word.bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = (Self::hash_word(&word.to_lowercase()) % self.dimension as u64) as usize;
            embedding[bucket] += 1.0;
        }

        // L2 normalize
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        Ok(embedding)
    }
}

/// A mock generator that streams a canned reply one token at a time.
pub struct MockGenerator {
    tokens: Vec<String>,
}

impl MockGenerator {
    /// Create a generator that replies with the given text, split on spaces.
    pub fn new(reply: &str) -> Self {
        Self {
            tokens: reply
                .split_inclusive(' ')
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate_stream(&self, _prompt: &str) -> Result<TokenStream> {
        let tokens: Vec<Result<String>> = self.tokens.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(tokens)))
    }
}

/// A generator that always fails, for exercising per-query error paths.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate_stream(&self, _prompt: &str) -> Result<TokenStream> {
        Err(AskdocsError::generation("model unreachable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_mock_embedder_deterministic() {
        let embedder = MockEmbedder::new();
        let e1 = embedder.embed("start a fire with friction").await.unwrap();
        let e2 = embedder.embed("start a fire with friction").await.unwrap();
        assert_eq!(e1, e2);
        assert_eq!(e1.len(), 64);

        let norm: f32 = e1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_mock_embedder_word_overlap_scores_higher() {
        let embedder = MockEmbedder::new();
        let query = embedder.embed("how to start a fire").await.unwrap();
        let related = embedder.embed("a fire needs dry tinder to start").await.unwrap();
        let unrelated = embedder.embed("boil water before drinking").await.unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_mock_generator_streams_tokens() {
        let generator = MockGenerator::new("Rub sticks together quickly.");
        let mut stream = generator.generate_stream("prompt").await.unwrap();

        let mut answer = String::new();
        let mut token_count = 0;
        while let Some(token) = stream.next().await {
            answer.push_str(&token.unwrap());
            token_count += 1;
        }

        assert_eq!(answer, "Rub sticks together quickly.");
        assert!(token_count > 1);
    }

    #[tokio::test]
    async fn test_failing_generator() {
        let generator = FailingGenerator;
        // TokenStream is not Debug, so unwrap_err() can't be used here.
        let err = match generator.generate_stream("prompt").await {
            Ok(_) => panic!("expected generate_stream to fail"),
            Err(e) => e,
        };
        assert!(matches!(err, AskdocsError::Generation { .. }));
    }
}
