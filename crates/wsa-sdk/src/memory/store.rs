//! Command memory store.
//!
//! Append-only log of `(command, output, feedback, embedding)` rows with an
//! exact similarity search. `similar` scans every stored entry; a different
//! index can replace the scan without changing the method signatures.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use wsa_core::types::NewCommandMemory;
use wsa_core::Database;

use super::embeddings::{cosine_similarity, vector_from_bytes, vector_to_bytes, Embedder};
use crate::SDKResult;

/// One `similar` hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCommand {
    pub command: String,
    pub output: String,
    pub feedback: Option<String>,
    pub score: f32,
}

/// Embedding-backed command memory.
#[derive(Clone)]
pub struct CommandMemory {
    db: Arc<Database>,
    embedder: Arc<dyn Embedder>,
}

impl CommandMemory {
    pub fn new(db: Arc<Database>, embedder: Arc<dyn Embedder>) -> Self {
        Self { db, embedder }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Embed `text` and append a Memory Entry.
    ///
    /// Empty feedback is stored as NULL.
    pub async fn remember(&self, text: &str, output: &str, feedback: Option<&str>) -> SDKResult<i64> {
        let vector = self.embedder.embed(text).await?;
        let feedback = feedback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from);

        let id = self.db.insert_command_memory(&NewCommandMemory {
            command: text.to_string(),
            output: output.to_string(),
            feedback,
            embedding: vector_to_bytes(&vector),
        })?;
        debug!("Remembered command #{} via {}", id, self.embedder.name());
        Ok(id)
    }

    /// The `top_n` stored entries most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub async fn similar(&self, query: &str, top_n: usize) -> SDKResult<Vec<SimilarCommand>> {
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        let rows = self.db.list_command_memory()?;

        let mut results: Vec<SimilarCommand> = rows
            .into_iter()
            .map(|row| {
                let score = cosine_similarity(&query_vector, &vector_from_bytes(&row.embedding));
                SimilarCommand {
                    command: row.command,
                    output: row.output,
                    feedback: row.feedback,
                    score,
                }
            })
            .collect();

        // sort_by is stable, so ties stay in insertion order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_n);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::embeddings::HashingEmbedder;
    use crate::SDKError;
    use async_trait::async_trait;

    fn memory() -> CommandMemory {
        let db = Arc::new(Database::open_in_memory().unwrap());
        CommandMemory::new(db, Arc::new(HashingEmbedder::default()))
    }

    /// Same vector for every input.
    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        fn name(&self) -> &str {
            "constant"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> SDKResult<Vec<f32>> {
            Ok(vec![1.0, 1.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        fn dimensions(&self) -> usize {
            0
        }

        async fn embed(&self, _text: &str) -> SDKResult<Vec<f32>> {
            Err(SDKError::embedding("offline"))
        }
    }

    #[tokio::test]
    async fn test_identical_text_scores_highest() {
        let memory = memory();
        memory.remember("show disk usage", "12G", None).await.unwrap();
        memory.remember("open chrome", "Started", None).await.unwrap();
        memory.remember("list files", "a b c", Some("")).await.unwrap();

        let results = memory.similar("open chrome", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].command, "open chrome");
        assert!((results[0].score - 1.0).abs() < 1e-5);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_top_n_truncates() {
        let memory = memory();
        for cmd in ["a", "b", "c", "d"] {
            memory.remember(cmd, "", None).await.unwrap();
        }
        assert_eq!(memory.similar("a", 2).await.unwrap().len(), 2);
        assert!(memory.similar("a", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let memory = CommandMemory::new(db, Arc::new(ConstantEmbedder));
        for cmd in ["first", "second", "third"] {
            memory.remember(cmd, "", None).await.unwrap();
        }

        let commands: Vec<String> = memory
            .similar("anything", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.command)
            .collect();
        assert_eq!(commands, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_feedback_is_kept_and_blank_is_null() {
        let memory = memory();
        memory.remember("open chrome", "ok", Some("  ")).await.unwrap();
        memory.remember("open chrome", "ok", Some("great")).await.unwrap();

        let results = memory.similar("open chrome", 2).await.unwrap();
        assert_eq!(results[0].feedback, None);
        assert_eq!(results[1].feedback.as_deref(), Some("great"));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_reported() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let memory = CommandMemory::new(db.clone(), Arc::new(FailingEmbedder));
        let err = memory.remember("x", "y", None).await.unwrap_err();
        assert!(err.is_embedding());
        assert!(db.list_command_memory().unwrap().is_empty());
    }
}
