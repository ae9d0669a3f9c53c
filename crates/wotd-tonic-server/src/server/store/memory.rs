use std::sync::Mutex;
use wotd_tonic_core::{NewWord, StoreError, Word, WordModifier, WordQuerier};

/// In-process word store with the same id semantics as the `SERIAL` column:
/// ids start at 1 and are never handed out twice.
#[derive(Default)]
pub struct MemoryWordStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i32,
    words: Vec<Word>,
}

#[tonic::async_trait]
impl WordQuerier for MemoryWordStore {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        Ok(self.inner.lock().unwrap().words.clone())
    }
}

#[tonic::async_trait]
impl WordModifier for MemoryWordStore {
    async fn insert_word(&self, word: NewWord) -> Result<Word, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.last_id += 1;
        let word = Word {
            id: inner.last_id,
            word: word.word,
            custom_definition: word.custom_definition,
        };
        inner.words.push(word.clone());
        Ok(word)
    }

    async fn delete_word(&self, id: i32) -> Result<Word, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let idx = inner
            .words
            .iter()
            .position(|w| w.id == id)
            .ok_or(StoreError::NotFound { id })?;
        Ok(inner.words.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryWordStore::default();
        let first = store.insert_word(NewWord::new("lexicon", "")).await.unwrap();
        store.delete_word(first.id).await.unwrap();
        let second = store.insert_word(NewWord::new("aurora", "")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn deleting_unknown_id_is_not_found() {
        let store = MemoryWordStore::default();
        let err = store.delete_word(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 42 }));
    }
}
