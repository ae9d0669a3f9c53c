//! gRPC service implementation for word records.
//!
//! [`WordService`] is the orchestration layer between transports and the word
//! store. It only ever sees the store through two capabilities: a
//! [`WordQuerier`] for reads and a [`WordModifier`] for writes.
//!
//! The inherent methods ([`WordService::add`], [`WordService::list`], ...)
//! carry the logic and return domain types. The [`MyWordOfTheDayService`]
//! impl translates them to protobuf messages, and the REST gateway translates
//! the same methods to JSON.

use crate::server::{
    service::random::random_word,
    telemetry::{record_rpc, record_rpc_error},
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use wotd_tonic_core::{
    Error, NewWord, Result, Word, WordModifier, WordQuerier,
    proto::{
        AddWordRequest, AddWordResponse, DeleteWordRequest, DeleteWordResponse, HeartbeatRequest,
        HeartbeatResponse, ListWordsRequest, ListWordsResponse, RandomWordRequest,
        RandomWordResponse, my_word_of_the_day_service_server::MyWordOfTheDayService,
    },
};

pub struct WordService<Q, M> {
    querier: Arc<Q>,
    modifier: Arc<M>,
}

impl<Q, M> Clone for WordService<Q, M> {
    fn clone(&self) -> Self {
        Self {
            querier: Arc::clone(&self.querier),
            modifier: Arc::clone(&self.modifier),
        }
    }
}

impl<Q: WordQuerier, M: WordModifier> WordService<Q, M> {
    pub fn new(querier: Arc<Q>, modifier: Arc<M>) -> Self {
        Self { querier, modifier }
    }

    /// Stores a new word exactly as given and returns the stored record.
    pub async fn add(&self, word: NewWord) -> Result<Word> {
        self.modifier.insert_word(word).await.map_err(Error::AddWord)
    }

    /// Every stored word, in store order.
    pub async fn list(&self) -> Result<Vec<Word>> {
        self.querier.list_words().await.map_err(Error::ListWords)
    }

    /// Deletes a word and returns what was deleted.
    pub async fn delete(&self, id: i32) -> Result<Word> {
        self.modifier
            .delete_word(id)
            .await
            .map_err(Error::DeleteWord)
    }

    /// A uniformly random word, or `None` if there are no words.
    pub async fn random(&self) -> Result<Option<Word>> {
        random_word(self.querier.as_ref()).await
    }
}

fn failed(rpc: &'static str) -> impl FnOnce(Error) -> Status {
    move |err| {
        record_rpc_error(rpc);
        tracing::warn!(rpc, error = %err, "Request failed");
        err.into()
    }
}

#[tonic::async_trait]
impl<Q: WordQuerier, M: WordModifier> MyWordOfTheDayService for WordService<Q, M> {
    async fn heartbeat(
        &self,
        _req: Request<HeartbeatRequest>,
    ) -> core::result::Result<Response<HeartbeatResponse>, Status> {
        record_rpc("Heartbeat");
        Ok(Response::new(HeartbeatResponse {}))
    }

    #[tracing::instrument(skip_all)]
    async fn add_word(
        &self,
        req: Request<AddWordRequest>,
    ) -> core::result::Result<Response<AddWordResponse>, Status> {
        record_rpc("AddWord");
        let word = req
            .into_inner()
            .word
            .map(NewWord::from)
            .unwrap_or_default();
        let word = self.add(word).await.map_err(failed("AddWord"))?;
        Ok(Response::new(AddWordResponse {
            word: Some(word.into()),
        }))
    }

    #[tracing::instrument(skip_all)]
    async fn list_words(
        &self,
        _req: Request<ListWordsRequest>,
    ) -> core::result::Result<Response<ListWordsResponse>, Status> {
        record_rpc("ListWords");
        let words = self.list().await.map_err(failed("ListWords"))?;
        Ok(Response::new(ListWordsResponse {
            words: words.into_iter().map(Into::into).collect(),
        }))
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn delete_word(
        &self,
        req: Request<DeleteWordRequest>,
    ) -> core::result::Result<Response<DeleteWordResponse>, Status> {
        record_rpc("DeleteWord");
        let word = self
            .delete(req.into_inner().id)
            .await
            .map_err(failed("DeleteWord"))?;
        Ok(Response::new(DeleteWordResponse {
            word: Some(word.into()),
        }))
    }

    #[tracing::instrument(skip_all)]
    async fn random_word(
        &self,
        _req: Request<RandomWordRequest>,
    ) -> core::result::Result<Response<RandomWordResponse>, Status> {
        record_rpc("RandomWord");
        let word = self.random().await.map_err(failed("RandomWord"))?;
        Ok(Response::new(RandomWordResponse {
            word: word.map(Into::into),
        }))
    }
}
