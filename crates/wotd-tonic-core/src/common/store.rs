//! Store capabilities.
//!
//! Access to persisted words is split in two: [`WordQuerier`] can only read
//! and [`WordModifier`] can only write. A component that should never mutate
//! state (for example the scheduled mail job) is given a querier and nothing
//! else, which the compiler then enforces.
//!
//! A single backend normally implements both traits and is shared behind an
//! `Arc`.

use crate::{NewWord, StoreError, Word};

/// Read-only access to stored words.
#[tonic::async_trait]
pub trait WordQuerier: Send + Sync + 'static {
    /// Returns every stored word. The order is unspecified and callers must
    /// not depend on it. An empty store yields an empty vector.
    async fn list_words(&self) -> Result<Vec<Word>, StoreError>;
}

/// Write access to stored words.
#[tonic::async_trait]
pub trait WordModifier: Send + Sync + 'static {
    /// Inserts a word and returns it with its newly assigned id.
    async fn insert_word(&self, word: NewWord) -> Result<Word, StoreError>;

    /// Deletes the word with `id` and returns a snapshot of the deleted row.
    ///
    /// Fails with [`StoreError::NotFound`] when no row has that id.
    async fn delete_word(&self, id: i32) -> Result<Word, StoreError>;
}
