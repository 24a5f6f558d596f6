use super::error::*;
use crate::application_impl::bearer_token;
use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn done(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiResponse {
            success: false,
            message: Some(message.clone()),
            data: None,
            error: Some(ApiError { code, message }),
            timestamp: Utc::now(),
        }
    }
}

fn rejection(error: AuthError) -> warp::Rejection {
    reject::custom(ApiErrorCode::from(error))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub user_type: UserType,
}

pub async fn register(
    body: RegisterRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = RegisterInput {
        email: body.email,
        password: body.password,
        user_type: body.user_type,
    };
    let result = session_manager.register(input).await.map_err(rejection)?;

    let message = format!("{} registered successfully", result.user_type);
    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(message, result)),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = LoginInput {
        email: body.email,
        password: body.password,
    };
    let result = session_manager.login(input).await.map_err(rejection)?;

    Ok(warp::reply::json(&ApiResponse::ok(
        "Logged in successfully",
        result,
    )))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager
        .refresh(&RefreshToken(body.refresh_token))
        .await
        .map_err(rejection)?;

    Ok(warp::reply::json(&ApiResponse::ok(
        "Token refreshed successfully",
        result,
    )))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
    pub user_id: UserId,
}

pub async fn logout(
    authorization: String,
    body: LogoutRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let access_token = bearer_token(Some(&authorization))
        .map(|token| AccessToken(token.to_string()))
        .ok_or_else(|| reject::custom(ApiErrorCode::Unauthenticated))?;

    session_manager
        .logout(
            &access_token,
            &RefreshToken(body.refresh_token),
            body.user_id,
        )
        .await
        .map_err(rejection)?;

    Ok(warp::reply::json(&ApiResponse::<()>::done(
        "Logged out successfully",
    )))
}

#[derive(Debug, Deserialize)]
pub struct LogoutAllRequest {
    pub user_id: UserId,
}

pub async fn logout_all(
    body: LogoutAllRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_manager
        .logout_all(body.user_id)
        .await
        .map_err(rejection)?;

    Ok(warp::reply::json(&ApiResponse::<()>::done(
        "All sessions terminated",
    )))
}

pub async fn me(principal: Principal) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok("Authenticated", principal)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub user_id: UserId,
    pub active_sessions: u64,
}

pub async fn sessions(
    principal: Principal,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let active_sessions = session_manager
        .active_session_count(principal.user_id)
        .await
        .map_err(rejection)?;

    let response = SessionsResponse {
        user_id: principal.user_id,
        active_sessions,
    };
    Ok(warp::reply::json(&ApiResponse::ok("Active sessions", response)))
}
