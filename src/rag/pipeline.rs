//! End-to-end retrieval-augmented answering.

use std::sync::Arc;

use super::context::{build_prompt, format_context};
use super::error::RagResult;
use crate::embedding::{Embedder, embed_one};
use crate::index::VectorIndex;
use crate::llm::CompletionService;
use crate::rerank::Reranker;

/// Neighbours fetched per query unless the caller asks otherwise.
pub const DEFAULT_TOP_K: usize = 10;

/// Largest `top_k` accepted from API callers.
pub const MAX_TOP_K: usize = 1000;

/// A retrieved chunk with its raw and boosted similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChunk {
    /// Insertion position in the index.
    pub position: i64,
    pub text: String,
    /// Cosine similarity from the index.
    pub score: f32,
    /// Score after re-ranking; equals `score` when no strategy applies.
    pub boosted_score: f32,
}

/// Embed → search → re-rank → format → complete.
///
/// Every collaborator is injected, so each test can build an isolated index.
/// The pipeline holds no per-query state and never retries.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    reranker: Reranker,
    completion: Arc<dyn CompletionService>,
    default_top_k: usize,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("indexed_chunks", &self.index.len())
            .field("reranker", &self.reranker)
            .field("default_top_k", &self.default_top_k)
            .finish()
    }
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        reranker: Reranker,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            embedder,
            index,
            reranker,
            completion,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Embed the query on the blocking pool so model inference does not stall
    /// other requests.
    async fn embed_query(&self, query: &str) -> RagResult<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embed_one(embedder.as_ref(), &text)).await??;
        Ok(vector)
    }

    /// Chunks relevant to `query`, best first after re-ranking.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RagResult<Vec<RankedChunk>> {
        let query_vector = self.embed_query(query).await?;
        let results = self.index.search(&query_vector, top_k);

        let found = results.len();
        let mut positions = Vec::with_capacity(found);
        let mut chunks = Vec::with_capacity(found);
        let mut scores = Vec::with_capacity(found);
        let mut metadata = Vec::with_capacity(found);
        for hit in results.hits() {
            positions.push(hit.position);
            chunks.push(self.index.get_text(hit.position));
            scores.push(hit.score);
            metadata.push(self.index.metadata(hit.position));
        }

        tracing::debug!(
            target: "rag",
            "retrieved {} of {top_k} requested chunks ({} indexed)",
            chunks.len(),
            self.index.len()
        );

        let has_metadata = metadata.iter().any(Option::is_some);
        let order = self.reranker.rank(
            &chunks,
            &scores,
            query,
            has_metadata.then_some(metadata.as_slice()),
        );

        let mut texts: Vec<Option<String>> = chunks.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|(i, boosted_score)| {
                texts[i].take().map(|text| RankedChunk {
                    position: positions[i],
                    text,
                    score: scores[i],
                    boosted_score,
                })
            })
            .collect())
    }

    /// The full prompt that would be sent for `query`.
    pub async fn prompt_for(&self, query: &str, top_k: usize) -> RagResult<String> {
        let chunks = self.retrieve(query, top_k).await?;
        Ok(prompt_from(query, &chunks))
    }

    /// Answer `query` from the indexed documents.
    ///
    /// `session_id` is accepted for conversational continuity but not used by
    /// any step yet. An empty index still produces a (context-free) prompt.
    pub async fn answer(
        &self,
        query: &str,
        top_k: usize,
        session_id: Option<&str>,
    ) -> RagResult<String> {
        tracing::info!(
            target: "rag",
            "answering query (top_k {top_k}, session {})",
            session_id.unwrap_or("-")
        );

        let chunks = self.retrieve(query, top_k).await?;
        self.answer_from(query, &chunks).await
    }

    /// Complete a prompt built from already retrieved `chunks`.
    pub async fn answer_from(&self, query: &str, chunks: &[RankedChunk]) -> RagResult<String> {
        let prompt = prompt_from(query, chunks);
        let answer = self.completion.complete(&prompt).await?;

        tracing::debug!(target: "rag", "completion returned {} chars", answer.len());
        Ok(answer)
    }
}

fn prompt_from(query: &str, chunks: &[RankedChunk]) -> String {
    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    build_prompt(&format_context(&texts), query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingResult;
    use crate::llm::{CompletionError, CompletionResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    const TOPICS: [&str; 3] = ["cat", "dog", "bird"];

    /// One axis per topic word; unrelated text lands on a shared fallback axis.
    struct TopicEmbedder;

    impl Embedder for TopicEmbedder {
        fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    let mut v: Vec<f32> = TOPICS
                        .iter()
                        .map(|t| if lower.contains(t) { 1.0 } else { 0.0 })
                        .collect();
                    v.push(0.1);
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            TOPICS.len() + 1
        }
    }

    #[derive(Default)]
    struct RecordingCompletion {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionService for RecordingCompletion {
        async fn complete(&self, prompt: &str) -> CompletionResult<String> {
            self.prompts.lock().push(prompt.to_string());
            Ok("stub answer".to_string())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl CompletionService for FailingCompletion {
        async fn complete(&self, _prompt: &str) -> CompletionResult<String> {
            Err(CompletionError::RateLimited)
        }
    }

    fn indexed(texts: &[&str]) -> Arc<VectorIndex> {
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let index = Arc::new(VectorIndex::new(TopicEmbedder.dimension()));
        let vectors = TopicEmbedder.embed(&texts).unwrap();
        index.insert(vectors, texts).unwrap();
        index
    }

    fn pipeline(
        index: Arc<VectorIndex>,
        completion: Arc<dyn CompletionService>,
    ) -> RagPipeline {
        RagPipeline::new(Arc::new(TopicEmbedder), index, Reranker::new(), completion)
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_similarity() {
        let index = indexed(&["A bird sings.", "The cat sleeps.", "A dog barks."]);
        let pipeline = pipeline(index, Arc::new(RecordingCompletion::default()));

        let chunks = pipeline.retrieve("tell me about the cat", 2).await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "The cat sleeps.");
        assert_eq!(chunks[0].position, 1);
        assert_eq!(chunks[0].score, chunks[0].boosted_score);
        assert!(chunks[0].score >= chunks[1].score);
    }

    #[tokio::test]
    async fn test_answer_sends_formatted_prompt() {
        let completion = Arc::new(RecordingCompletion::default());
        let index = indexed(&["The cat sleeps.", "A dog barks."]);
        let pipeline = pipeline(index, completion.clone());

        let answer = pipeline.answer("cat?", 1, Some("session-1")).await.unwrap();
        assert_eq!(answer, "stub answer");

        let prompts = completion.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            "Based on the following documents:\n[1] The cat sleeps.\n\nAnswer the question below.\nQuestion: cat?"
        );
    }

    #[tokio::test]
    async fn test_empty_index_still_completes() {
        let completion = Arc::new(RecordingCompletion::default());
        let index = Arc::new(VectorIndex::new(TopicEmbedder.dimension()));
        let pipeline = pipeline(index, completion.clone());

        let answer = pipeline.answer("anything", DEFAULT_TOP_K, None).await.unwrap();
        assert_eq!(answer, "stub answer");
        let prompts = completion.prompts.lock();
        assert!(!prompts[0].contains("[1]"));
        assert!(prompts[0].ends_with("Question: anything"));
    }

    #[tokio::test]
    async fn test_top_k_larger_than_index() {
        let index = indexed(&["The cat sleeps."]);
        let pipeline = pipeline(index, Arc::new(RecordingCompletion::default()));

        let chunks = pipeline.retrieve("cat", 10).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "The cat sleeps.");
    }

    #[tokio::test]
    async fn test_answer_from_reuses_retrieved_chunks() {
        let completion = Arc::new(RecordingCompletion::default());
        let index = indexed(&["The cat sleeps.", "A dog barks."]);
        let pipeline = pipeline(index, completion.clone());

        let chunks = pipeline.retrieve("cat?", 1).await.unwrap();
        let expected = pipeline.prompt_for("cat?", 1).await.unwrap();
        pipeline.answer_from("cat?", &chunks).await.unwrap();

        assert_eq!(*completion.prompts.lock(), vec![expected]);
    }

    #[tokio::test]
    async fn test_completion_error_propagates() {
        let index = indexed(&["The cat sleeps."]);
        let pipeline = pipeline(index, Arc::new(FailingCompletion));

        let err = pipeline.answer("cat", 1, None).await.unwrap_err();
        assert!(matches!(
            err,
            super::super::RagError::Completion(CompletionError::RateLimited)
        ));
    }
}
