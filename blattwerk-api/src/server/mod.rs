use crate::server::{anti_forgery::AntiForgeryError, cache::ResponseCache, json::Json};
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use blattwerk_common::model::{Id, ModelValidationError, group::GroupMarker, post::PostMarker};
use blattwerk_db::client::{DbClient, DbError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

pub mod anti_forgery;
pub mod auth;
pub mod cache;
pub mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub response_cache: Arc<ResponseCache>,
}

/// Login entry point of the identity collaborator fronting this service.
pub const LOGIN_PATH: &str = "/auth/login/";

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
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("The request carries no identity")]
    Unauthenticated,
    #[error("The anti-forgery check failed: {0}")]
    AntiForgery(#[from] AntiForgeryError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Group with slug {0} was not found.")]
    GroupBySlugNotFound(String),
    #[error("User with username {0} was not found.")]
    UserByUsernameNotFound(String),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Group with id {0} is not a valid choice.")]
    UnknownGroupChoice(Id<GroupMarker>),
    #[error("A submitted field was invalid: {0}")]
    Validation(#[from] ModelValidationError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::GroupBySlugNotFound(_)
            | ServerError::UserByUsernameNotFound(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::AntiForgery(_) => StatusCode::FORBIDDEN,
            ServerError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::UnknownGroupChoice(_) | ServerError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::GroupBySlugNotFound(_)
            | ServerError::UserByUsernameNotFound(_)
            | ServerError::PostByIdNotFound(_) => "not_found",
            ServerError::Unauthenticated => "unauthenticated",
            ServerError::AntiForgery(_) => "anti_forgery",
            ServerError::JsonRejection(_) => "bad_request",
            ServerError::UnknownGroupChoice(_) | ServerError::Validation(_) => "validation",
            ServerError::JsonResponse(_) | ServerError::Database(_) => "server_fault",
        }
    }

    fn path(&self) -> Option<String> {
        match self {
            ServerError::UnknownRoute(uri) => Some(uri.path().to_owned()),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Anonymous access to a protected route redirects to login instead
        // of rendering an error page.
        if matches!(self, ServerError::Unauthenticated) {
            debug!("Redirecting unauthenticated request to login");
            return Redirect::to(LOGIN_PATH).into_response();
        }

        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            error: self.kind(),
            path: self.path(),
        };
        (status, Json(error_response)).into_response()
    }
}
