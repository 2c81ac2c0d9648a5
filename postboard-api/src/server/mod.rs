use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use postboard_common::model::{
    Id,
    post::{MissingFieldsError, PostField, PostMarker},
};
use postboard_db::client::{DbClient, DbError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Invalid id: {0}")]
    InvalidId(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error(transparent)]
    Validation(#[from] MissingFieldsError),
    #[error("Failed to read posts: {0}")]
    StoreRead(DbError),
    #[error("Failed to write post: {0}")]
    StoreWrite(DbError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) | ServerError::PostByIdNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ServerError::InvalidId(_)
            | ServerError::JsonRejection(_)
            | ServerError::Validation(_)
            | ServerError::StoreWrite(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::StoreRead(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classifies a failed write. Updates that would empty a required field are validation errors.
    pub fn store_write(error: DbError) -> Self {
        match error {
            DbError::InvalidUpdate(missing) => ServerError::Validation(missing),
            error => ServerError::StoreWrite(error),
        }
    }

    fn fields(&self) -> Option<Vec<PostField>> {
        match self {
            ServerError::Validation(missing) => Some(missing.fields().to_vec()),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct ErrorResponse {
    status: u16,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<PostField>>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            error: self.to_string(),
            fields: self.fields(),
        };
        (status, Json(error_response)).into_response()
    }
}
