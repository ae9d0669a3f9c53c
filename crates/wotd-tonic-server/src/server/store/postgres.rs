//! Postgres-backed word store.
//!
//! Every operation is a single statement against the `words` table, executed
//! on a connection borrowed from the shared [`PgPool`] for the duration of
//! that call only. Nothing is retried here; failures are mapped into
//! [`StoreError`] and returned to the caller. Pool exhaustion and broken
//! connections are reported as [`StoreError::Unavailable`].

use crate::server::config::DatabaseConfig;
use sqlx::{
    Connection, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use wotd_tonic_core::{NewWord, StoreError, Word, WordModifier, WordQuerier};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(sqlx::FromRow)]
struct WordRow {
    id: i32,
    word: String,
    custom_definition: String,
}

impl From<WordRow> for Word {
    fn from(row: WordRow) -> Self {
        Self {
            id: row.id,
            word: row.word,
            custom_definition: row.custom_definition,
        }
    }
}

/// Maps connection-level failures to `Unavailable` and everything else
/// through `wrap`.
fn classify<F>(wrap: F) -> impl FnOnce(sqlx::Error) -> StoreError
where
    F: FnOnce(sqlx::Error) -> StoreError,
{
    move |err| match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::unavailable(err),
        err => wrap(err),
    }
}

#[derive(Clone, Debug)]
pub struct PgWordStore {
    pool: PgPool,
}

impl PgWordStore {
    /// Opens a connection pool and verifies that the database is reachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .connect_with(options)
            .await
            .map_err(StoreError::unavailable)?;

        Ok(Self { pool })
    }

    /// Creates the `words` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(StoreError::unavailable)
    }

    /// Succeeds iff a pooled connection answers a ping.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::unavailable)?;
        conn.ping().await.map_err(StoreError::unavailable)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[tonic::async_trait]
impl WordQuerier for PgWordStore {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        let rows: Vec<WordRow> =
            sqlx::query_as("SELECT id, word, custom_definition FROM words")
                .fetch_all(&self.pool)
                .await
                .map_err(classify(StoreError::query))?;

        tracing::info!(row_count = rows.len(), "Words queried successfully");
        Ok(rows.into_iter().map(Word::from).collect())
    }
}

#[tonic::async_trait]
impl WordModifier for PgWordStore {
    async fn insert_word(&self, word: NewWord) -> Result<Word, StoreError> {
        let row: WordRow = sqlx::query_as(
            "INSERT INTO words (word, custom_definition) VALUES ($1, $2) \
             RETURNING id, word, custom_definition",
        )
        .bind(word.word)
        .bind(word.custom_definition)
        .fetch_one(&self.pool)
        .await
        .map_err(classify(StoreError::insert))?;

        tracing::info!(id = row.id, "Word inserted successfully");
        Ok(row.into())
    }

    async fn delete_word(&self, id: i32) -> Result<Word, StoreError> {
        let row: WordRow = sqlx::query_as(
            "DELETE FROM words WHERE id = $1 RETURNING id, word, custom_definition",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify(StoreError::delete))?
        .ok_or(StoreError::NotFound { id })?;

        tracing::info!(id = row.id, "Word deleted successfully");
        Ok(row.into())
    }
}
