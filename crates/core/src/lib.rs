//! # BuddyBot Core
//!
//! Domain types, ports, and error definitions for the BuddyBot retrieval
//! chatbot. This crate has **no framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every collaborator (LLM, vector index, history store, platform source) is
//! a trait here. Implementations live in their respective crates, which keeps
//! the ranking pipeline testable with plain in-process doubles.

pub mod error;
pub mod document;
pub mod chat;
pub mod ingest;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use document::{AnnotatedDocument, Document, Metadata, ScoredDocument};
pub use chat::{Answer, Header, Message, Question, QuestionAnswerPair, Sender};
pub use ingest::{LastLoadOutcome, LoadingAttempt, LoadingItem, PlatformLog, VectorStoreLog};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use store::{Embedder, LoadLogStore, MessageStore, PlatformSource, SimilaritySearch, VectorIndex};
