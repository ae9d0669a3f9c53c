//! # Word records
//!
//! [`Word`] is the one persisted entity: a store-assigned `id`, the word
//! itself and an optional custom definition (empty when not given). Words are
//! created and deleted but never updated, and an `id` is never reused once
//! its word has been deleted. Uniqueness of `id` is the store's job.
//!
//! [`NewWord`] is the insert payload, i.e. a word without an id yet.
//!
//! Both convert to and from the generated protobuf [`proto::Word`].

use crate::proto;

/// A stored word of the day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Word {
    pub id: i32,
    pub word: String,
    pub custom_definition: String,
}

/// A word that has not been persisted yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewWord {
    pub word: String,
    pub custom_definition: String,
}

impl NewWord {
    pub fn new(word: impl Into<String>, custom_definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            custom_definition: custom_definition.into(),
        }
    }
}

impl From<Word> for proto::Word {
    fn from(word: Word) -> Self {
        Self {
            id: word.id,
            word: word.word,
            custom_definition: word.custom_definition,
        }
    }
}

impl From<proto::Word> for Word {
    fn from(word: proto::Word) -> Self {
        Self {
            id: word.id,
            word: word.word,
            custom_definition: word.custom_definition,
        }
    }
}

/// The id of an incoming protobuf word is ignored; the store assigns one.
impl From<proto::Word> for NewWord {
    fn from(word: proto::Word) -> Self {
        Self {
            word: word.word,
            custom_definition: word.custom_definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_id_is_dropped() {
        let new: NewWord = proto::Word {
            id: 99,
            word: "aurora".into(),
            custom_definition: "a natural light display".into(),
        }
        .into();
        assert_eq!(new, NewWord::new("aurora", "a natural light display"));
    }

    #[test]
    fn missing_definition_defaults_to_empty() {
        let new: NewWord = proto::Word {
            word: "lexicon".into(),
            ..Default::default()
        }
        .into();
        assert_eq!(new.custom_definition, "");
    }
}
