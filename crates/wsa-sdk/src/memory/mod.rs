//! Command memory
//!
//! Every processed command is embedded and appended to `command_memory`,
//! and later queries rank stored commands by cosine similarity.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wsa_core::Database;
//! use wsa_sdk::memory::{CommandMemory, HashingEmbedder};
//!
//! async fn example() -> wsa_sdk::SDKResult<()> {
//!     let db = Arc::new(Database::open_in_memory()?);
//!     let memory = CommandMemory::new(db, Arc::new(HashingEmbedder::default()));
//!
//!     memory.remember("show disk usage", "12G\t/home/me", None).await?;
//!     for hit in memory.similar("disk usage", 3).await? {
//!         println!("{:.2} {}", hit.score, hit.command);
//!     }
//!     Ok(())
//! }
//! ```

pub mod embeddings;
mod store;

pub use embeddings::{
    cosine_similarity, Embedder, EmbeddingService, HashingEmbedder, EMBEDDING_DIMENSIONS,
};
pub use store::{CommandMemory, SimilarCommand};
