use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::logic::{PatchError, ValidationErrors};
use crate::model::Id;
use crate::store::CommitConflict;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("City with id {0} was not found")]
    CityNotFound(Id),
    #[error("Point of interest with id {point_of_interest_id} was not found in city {city_id}")]
    PointOfInterestNotFound { city_id: Id, point_of_interest_id: Id },
    #[error("One or more validation errors occurred")]
    Validation(ValidationErrors),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("An unexpected error occurred")]
    Persistence(anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            errors: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CityNotFound(_) | ApiError::PointOfInterestNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Validation(_) | ApiError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PatchError> for ApiError {
    fn from(error: PatchError) -> Self {
        match error {
            PatchError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::PreconditionFailed(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast_ref::<CommitConflict>() {
            Some(CommitConflict::CityMissing { city_id }) => ApiError::CityNotFound(*city_id),
            Some(CommitConflict::PointOfInterestMissing { city_id, id }) => {
                ApiError::PointOfInterestNotFound {
                    city_id: *city_id,
                    point_of_interest_id: *id,
                }
            }
            None => ApiError::Persistence(error),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                error: "One or more validation errors occurred".to_string(),
                errors: Some(errors),
            },
            ApiError::Persistence(error) => {
                // Full detail goes to the log only
                log::error!("Persistence failure: {:#}", error);
                ErrorResponse::new("An unexpected error occurred")
            }
            other => ErrorResponse::new(&other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
