use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(code) = err.find::<ApiErrorCode>() {
        (code.clone(), code.to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (ApiErrorCode::InvalidInput, e.to_string())
    } else if err.find::<reject::MissingHeader>().is_some() {
        (ApiErrorCode::Unauthenticated, ApiErrorCode::Unauthenticated.to_string())
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            ApiErrorCode::NotFound.to_string(),
        ));
        return Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND));
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            "Method not allowed",
        ));
        return Ok(warp::reply::with_status(json, StatusCode::METHOD_NOT_ALLOWED));
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        )
    };

    let status = code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid request")]
    InvalidInput,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    DuplicateIdentity,
    #[error("Token is malformed")]
    TokenMalformed,
    #[error("Token signature is invalid")]
    TokenSignatureInvalid,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token has been invalidated")]
    TokenRevoked,
    #[error("Refresh token not found")]
    RefreshTokenNotFound,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("User not found")]
    UserNotFound,
    #[error("Not found")]
    NotFound,
    #[error("Service temporarily unavailable")]
    UpstreamUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::TokenMalformed
            | ApiErrorCode::TokenSignatureInvalid
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::TokenRevoked
            | ApiErrorCode::RefreshTokenNotFound
            | ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UserNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::DuplicateIdentity => StatusCode::CONFLICT,
            ApiErrorCode::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::DuplicateIdentity => ApiErrorCode::DuplicateIdentity,
            AuthError::TokenMalformed => ApiErrorCode::TokenMalformed,
            AuthError::TokenSignatureInvalid => ApiErrorCode::TokenSignatureInvalid,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenRevoked => ApiErrorCode::TokenRevoked,
            AuthError::RefreshTokenNotFound => ApiErrorCode::RefreshTokenNotFound,
            AuthError::UserNotFound => ApiErrorCode::UserNotFound,
            AuthError::InvalidInput(_) => ApiErrorCode::InvalidInput,
            AuthError::UpstreamTimeout => ApiErrorCode::UpstreamUnavailable,
            AuthError::Store(e) => {
                warn!("Store error: {}", e);
                ApiErrorCode::UpstreamUnavailable
            }
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}
