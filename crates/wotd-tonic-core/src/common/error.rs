//! Error types for the word service.
//!
//! Two layers:
//!
//! - [`StoreError`] is what a word store reports. Backend errors are boxed so
//!   the store contract does not depend on any particular database driver.
//! - [`Error`] is what the RPC layer reports. Each store-backed variant wraps
//!   the [`StoreError`] with a prefix naming the operation that failed
//!   (`unable to add word: ...`), so clients can tell operations apart without
//!   seeing storage internals beyond a readable message.
//!
//! `From<Error>` for [`tonic::Status`] picks the gRPC code.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Boxed backend error carried by [`StoreError`].
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Failure reported by a word store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Inserting a row failed.
    #[error("insert failed: {0}")]
    Insert(#[source] BoxError),

    /// Reading rows failed.
    #[error("query failed: {0}")]
    Query(#[source] BoxError),

    /// Deleting a row failed for a reason other than a missing id.
    #[error("delete failed: {0}")]
    Delete(#[source] BoxError),

    /// No row has the requested id.
    #[error("no word with id {id}")]
    NotFound { id: i32 },

    /// The backing connection could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] BoxError),
}

impl StoreError {
    pub fn insert(err: impl Into<BoxError>) -> Self {
        Self::Insert(err.into())
    }

    pub fn query(err: impl Into<BoxError>) -> Self {
        Self::Query(err.into())
    }

    pub fn delete(err: impl Into<BoxError>) -> Self {
        Self::Delete(err.into())
    }

    pub fn unavailable(err: impl Into<BoxError>) -> Self {
        Self::Unavailable(err.into())
    }
}

/// Unified error type for the word service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to add word: {0}")]
    AddWord(#[source] StoreError),

    #[error("unable to list words: {0}")]
    ListWords(#[source] StoreError),

    #[error("unable to delete word: {0}")]
    DeleteWord(#[source] StoreError),

    /// Fetching the candidates for a random pick failed.
    #[error("unable to get words: {0}")]
    RandomWord(#[source] StoreError),
}

impl Error {
    /// The store failure behind this error.
    pub fn store_error(&self) -> &StoreError {
        match self {
            Error::AddWord(e)
            | Error::ListWords(e)
            | Error::DeleteWord(e)
            | Error::RandomWord(e) => e,
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err.store_error() {
            StoreError::NotFound { .. } => Status::not_found(message),
            StoreError::Unavailable(_) => Status::unavailable(message),
            _ => Status::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn messages_carry_operation_prefix() {
        let err = Error::AddWord(StoreError::insert("connection reset"));
        assert_eq!(err.to_string(), "unable to add word: insert failed: connection reset");

        let err = Error::ListWords(StoreError::query("boom"));
        assert!(err.to_string().starts_with("unable to list words: "));

        let err = Error::DeleteWord(StoreError::NotFound { id: 7 });
        assert_eq!(err.to_string(), "unable to delete word: no word with id 7");

        let err = Error::RandomWord(StoreError::query("boom"));
        assert!(err.to_string().starts_with("unable to get words: "));
    }

    #[test]
    fn status_codes() {
        let status: Status = Error::DeleteWord(StoreError::NotFound { id: 7 }).into();
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "unable to delete word: no word with id 7");

        let status: Status = Error::ListWords(StoreError::query("boom")).into();
        assert_eq!(status.code(), Code::Internal);

        let status: Status = Error::AddWord(StoreError::unavailable("down")).into();
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "unable to add word: store unavailable: down");

        let status: Status = Error::RandomWord(StoreError::unavailable("down")).into();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[test]
    fn source_chain_is_preserved() {
        use core::error::Error as _;

        let err = Error::DeleteWord(StoreError::delete("lost connection"));
        let store = err.source().expect("store error");
        assert_eq!(store.to_string(), "delete failed: lost connection");
        assert_eq!(store.source().expect("backend").to_string(), "lost connection");
    }
}
