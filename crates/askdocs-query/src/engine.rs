//! Query engine: retrieve, render, generate.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use askdocs_core::{
    AskdocsError, Embedder, Generator, PromptTemplate, Result, SourceNode, TokenStream,
    VectorStore,
};

/// One query/response exchange: the streamed answer plus the ranked sources
/// that produced it.
pub struct QueryResponse {
    /// Incremental answer tokens, ended by model completion.
    pub tokens: TokenStream,

    /// Retrieved sources, ranked by descending similarity.
    pub sources: Vec<SourceNode>,
}

impl std::fmt::Debug for QueryResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResponse")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Composes retrieval with a prompt template and the language model.
pub struct QueryEngine<S, E, G> {
    store: Arc<S>,
    embedder: Arc<E>,
    generator: Arc<G>,
    template: PromptTemplate,
    collection: String,
    top_k: usize,
}

impl<S, E, G> std::fmt::Debug for QueryEngine<S, E, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("collection", &self.collection)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl<S, E, G> QueryEngine<S, E, G>
where
    S: VectorStore,
    E: Embedder,
    G: Generator,
{
    /// Open a query engine over an existing collection.
    ///
    /// Fails with [`AskdocsError::CollectionNotFound`] before any model call
    /// if the collection has not been ingested; the caller decides exit
    /// behavior.
    pub async fn open(
        store: Arc<S>,
        embedder: Arc<E>,
        generator: Arc<G>,
        collection: &str,
        top_k: usize,
    ) -> Result<Self> {
        if !store.collection_exists(collection).await? {
            return Err(AskdocsError::CollectionNotFound {
                name: collection.to_string(),
            });
        }

        let entries = store.count_entries(collection).await?;
        info!(
            "Query engine ready: collection '{}' with {} entries, top_k={}",
            collection, entries, top_k
        );

        Ok(Self {
            store,
            embedder,
            generator,
            template: PromptTemplate::default(),
            collection: collection.to_string(),
            top_k,
        })
    }

    /// Replace the default prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Run one query: embed, retrieve top-k, render the prompt, and start
    /// streaming the answer.
    pub async fn query(&self, question: &str) -> Result<QueryResponse> {
        let start = Instant::now();

        let query_embedding = self.embedder.embed(question).await?;

        let sources = self
            .store
            .similarity_search(&self.collection, &query_embedding, self.top_k)
            .await?;

        debug!(
            "Retrieved {} source(s) in {}ms",
            sources.len(),
            start.elapsed().as_millis()
        );

        let context = sources
            .iter()
            .map(|node| node.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self.template.render(&context, question);
        let tokens = self.generator.generate_stream(&prompt).await?;

        Ok(QueryResponse { tokens, sources })
    }
}
