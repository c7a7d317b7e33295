//! Marginalia - Retrieval-Augmented Reading Assistant
//!
//! Answers student questions from indexed course material. A question is
//! embedded, matched against a hybrid (keyword + vector) search index, and
//! handed to a chat model together with the retrieved passages so that the
//! answer carries `[C1]`-style citations back to its sources.

pub mod config;
pub mod error;
pub mod index;
pub mod rag;
pub mod server;
pub mod services;
pub mod types;

pub use error::{Backend, RagError, Result};
