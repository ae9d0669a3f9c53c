//! JSON/REST gateway.
//!
//! Routes mirror the gRPC methods and are mounted under `/api`, which is
//! stripped before routing:
//!
//! | Method   | Path                       | RPC          |
//! |----------|----------------------------|--------------|
//! | `GET`    | `/api/v1alpha1/heartbeat`  | `Heartbeat`  |
//! | `GET`    | `/api/v1alpha1/words`      | `ListWords`  |
//! | `POST`   | `/api/v1alpha1/words`      | `AddWord`    |
//! | `GET`    | `/api/v1alpha1/words/random` | `RandomWord` |
//! | `DELETE` | `/api/v1alpha1/words/{id}` | `DeleteWord` |
//!
//! Bodies use the proto3 JSON field names (`customDefinition`). Failures,
//! including unparsable bodies and ids, are returned as
//! `{"code": <grpc code>, "message": "..."}` with the matching HTTP status.

use crate::server::{
    service::WordService,
    telemetry::{record_rpc, record_rpc_error},
};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::{Code, Status};
use wotd_tonic_core::{Error, NewWord, Word, WordModifier, WordQuerier};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WordBody {
    pub id: i32,
    pub word: String,
    pub custom_definition: String,
}

impl From<Word> for WordBody {
    fn from(word: Word) -> Self {
        Self {
            id: word.id,
            word: word.word,
            custom_definition: word.custom_definition,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WordEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<WordBody>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WordList {
    pub words: Vec<WordBody>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

/// A failed request, rendered the way grpc-gateway renders a status.
#[derive(Debug)]
pub struct GatewayError(Status);

impl GatewayError {
    fn recorded(rpc: &'static str) -> impl FnOnce(Error) -> Self {
        move |err| {
            record_rpc_error(rpc);
            tracing::warn!(rpc, error = %err, "Gateway request failed");
            Self(err.into())
        }
    }

    /// Malformed input never reaches the service and reads as `INVALID_ARGUMENT`.
    fn rejected<R: std::fmt::Display>(rpc: &'static str) -> impl FnOnce(R) -> Self {
        move |rejection| {
            record_rpc_error(rpc);
            tracing::debug!(rpc, error = %rejection, "Gateway request rejected");
            Self(Status::invalid_argument(rejection.to_string()))
        }
    }
}

const fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::REQUEST_TIMEOUT,
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.0.code() as i32,
            message: self.0.message().to_string(),
        };
        (http_status(self.0.code()), Json(body)).into_response()
    }
}

type GatewayResult<T> = Result<Json<T>, GatewayError>;

async fn heartbeat() -> Json<serde_json::Value> {
    record_rpc("Heartbeat");
    Json(serde_json::json!({}))
}

async fn add_word<Q: WordQuerier, M: WordModifier>(
    State(service): State<WordService<Q, M>>,
    body: Result<Json<WordEnvelope>, JsonRejection>,
) -> GatewayResult<WordEnvelope> {
    record_rpc("AddWord");
    let Json(body) = body.map_err(GatewayError::rejected("AddWord"))?;
    let word = body
        .word
        .map(|w| NewWord::new(w.word, w.custom_definition))
        .unwrap_or_default();
    let word = service
        .add(word)
        .await
        .map_err(GatewayError::recorded("AddWord"))?;
    Ok(Json(WordEnvelope {
        word: Some(word.into()),
    }))
}

async fn list_words<Q: WordQuerier, M: WordModifier>(
    State(service): State<WordService<Q, M>>,
) -> GatewayResult<WordList> {
    record_rpc("ListWords");
    let words = service
        .list()
        .await
        .map_err(GatewayError::recorded("ListWords"))?;
    Ok(Json(WordList {
        words: words.into_iter().map(Into::into).collect(),
    }))
}

async fn delete_word<Q: WordQuerier, M: WordModifier>(
    State(service): State<WordService<Q, M>>,
    id: Result<Path<i32>, PathRejection>,
) -> GatewayResult<WordEnvelope> {
    record_rpc("DeleteWord");
    let Path(id) = id.map_err(GatewayError::rejected("DeleteWord"))?;
    let word = service
        .delete(id)
        .await
        .map_err(GatewayError::recorded("DeleteWord"))?;
    Ok(Json(WordEnvelope {
        word: Some(word.into()),
    }))
}

async fn random_word<Q: WordQuerier, M: WordModifier>(
    State(service): State<WordService<Q, M>>,
) -> GatewayResult<WordEnvelope> {
    record_rpc("RandomWord");
    let word = service
        .random()
        .await
        .map_err(GatewayError::recorded("RandomWord"))?;
    Ok(Json(WordEnvelope {
        word: word.map(Into::into),
    }))
}

/// Builds the gateway routes with `/api` stripped.
pub fn router<Q: WordQuerier, M: WordModifier>(service: WordService<Q, M>) -> Router {
    let v1alpha1 = Router::new()
        .route("/heartbeat", get(heartbeat))
        .route("/words", get(list_words::<Q, M>).post(add_word::<Q, M>))
        .route("/words/random", get(random_word::<Q, M>))
        .route("/words/{id}", delete(delete_word::<Q, M>))
        .with_state(service);

    Router::new().nest("/api", Router::new().nest("/v1alpha1", v1alpha1))
}

/// Serves the gateway on `listener` until `token` is cancelled.
pub async fn serve<Q: WordQuerier, M: WordModifier>(
    listener: TcpListener,
    service: WordService<Q, M>,
    token: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
}
