//! Uniform random selection of a stored word.
//!
//! Indices come from [`rand::rng`], the thread-local ChaCha-based generator
//! seeded from the operating system, so a pick cannot be predicted from
//! earlier ones. `random_range` rejects biased samples, so every element is
//! chosen with probability exactly `1/N`.

use rand::Rng;
use wotd_tonic_core::{Error, Result, Word, WordQuerier};

/// Draws an index in `[0, len)`, or `None` when `len` is zero.
pub fn choose_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.random_range(0..len))
}

/// Removes and returns one element chosen uniformly at random.
pub fn pick<T>(mut items: Vec<T>) -> Option<T> {
    let idx = choose_index(&mut rand::rng(), items.len())?;
    Some(items.swap_remove(idx))
}

/// Lists every word and picks one.
///
/// `Ok(None)` means no words exist; that is a valid result, not a failure.
pub async fn random_word<Q: WordQuerier + ?Sized>(querier: &Q) -> Result<Option<Word>> {
    let words = querier.list_words().await.map_err(Error::RandomWord)?;
    Ok(pick(words))
}
