//! HTTP error mapping. Every error body is `{"error": "<message>"}`.

use crate::logic::{ScrimError, SweepError};
use crate::models::TournamentError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Tournament(#[from] TournamentError),
    #[error(transparent)]
    Scrim(#[from] ScrimError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error("{0}")]
    Internal(String),
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Duplicate { .. } => StatusCode::CONFLICT,
        StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Tournament(e) => match e {
                TournamentError::NotFound { .. } => StatusCode::NOT_FOUND,
                TournamentError::NotOrganizer
                | TournamentError::NotOfficial
                | TournamentError::NotTeamOwner => StatusCode::FORBIDDEN,
                TournamentError::Store(s) => store_status(s),
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Scrim(e) => match e {
                ScrimError::ScrimNotFound(_) | ScrimError::TeamNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ScrimError::NotTeamOwner => StatusCode::FORBIDDEN,
                ScrimError::Store(s) => store_status(s),
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Store(e) => store_status(e),
            ApiError::Sweep(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}
