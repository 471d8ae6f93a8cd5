//! Storage for BuddyBot: the vector index, its embedders, chat history and
//! the ingestion audit log.

pub mod embedder;
pub mod history;
pub mod index;
pub mod vector;

pub use embedder::{HashingEmbedder, ProviderEmbedder};
pub use history::{FileHistory, InMemoryHistory};
pub use index::InMemoryIndex;
pub use vector::{squared_l2_distance, cosine_similarity};
