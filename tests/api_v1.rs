mod common;

use common::*;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warden::api;
use warden::server::Server;
use warp::Filter;
use warp::http::StatusCode;

fn api_v1(
    h: &Harness,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let server = Arc::new(Server::new(
        h.session_manager.clone(),
        h.authenticator.clone(),
    ));
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server))
        .recover(api::v1::recover_error)
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

async fn post<F, R>(
    filter: &F,
    path: &str,
    payload: Value,
    authorization: Option<&str>,
) -> (StatusCode, Value)
where
    F: Filter<Extract = (R,), Error = Infallible> + Clone + Send + Sync + 'static,
    R: warp::Reply + Send,
{
    let mut request = warp::test::request().method("POST").path(path).json(&payload);
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    let response = request.reply(filter).await;
    (response.status(), json_body(response.body()))
}

async fn get<F, R>(filter: &F, path: &str, authorization: Option<&str>) -> (StatusCode, Value)
where
    F: Filter<Extract = (R,), Error = Infallible> + Clone + Send + Sync + 'static,
    R: warp::Reply + Send,
{
    let mut request = warp::test::request().method("GET").path(path);
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    let response = request.reply(filter).await;
    (response.status(), json_body(response.body()))
}

async fn register<F, R>(filter: &F, email: &str) -> Value
where
    F: Filter<Extract = (R,), Error = Infallible> + Clone + Send + Sync + 'static,
    R: warp::Reply + Send,
{
    let (status, body) = post(
        filter,
        "/api/v1/auth/register",
        json!({"email": email, "password": PASSWORD, "userType": "employer"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn register_returns_created_with_camel_case_pair() {
    let h = Harness::new();
    let filter = api_v1(&h);

    let body = register(&filter, "amy@example.com").await;

    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("registered"));
    assert!(body.get("error").is_none());
    let data = &body["data"];
    assert_eq!(data["tokenType"], "Bearer");
    assert_eq!(data["email"], "amy@example.com");
    assert_eq!(data["userType"], "employer");
    assert!(data["accessToken"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(data["refreshToken"].as_str().unwrap().len(), 43);
    assert!(data["userId"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());

    let (status, dup) = post(
        &filter,
        "/api/v1/auth/register",
        json!({"email": "amy@example.com", "password": "x", "userType": "applicant"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["success"], false);
    assert_eq!(dup["error"]["code"], "DuplicateIdentity");
}

#[tokio::test]
async fn bad_payloads_are_bad_requests() {
    let h = Harness::new();
    let filter = api_v1(&h);

    let (status, body) = post(
        &filter,
        "/api/v1/auth/register",
        json!({"email": "no-at-sign", "password": "pw", "userType": "employer"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "InvalidInput");

    let (status, body) = post(
        &filter,
        "/api/v1/auth/register",
        json!({"email": "x@example.com", "password": "pw", "userType": "admin"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "InvalidInput");
}

#[tokio::test]
async fn login_and_refresh_rotate_tokens() {
    let h = Harness::new();
    let filter = api_v1(&h);
    register(&filter, "bo@example.com").await;

    let (status, body) = post(
        &filter,
        "/api/v1/auth/login",
        json!({"email": "bo@example.com", "password": "wrong"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "InvalidCredentials");

    let (status, login) = post(
        &filter,
        "/api/v1/auth/login",
        json!({"email": "bo@example.com", "password": PASSWORD}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refresh_token = login["data"]["refreshToken"].clone();

    let (status, refreshed) = post(
        &filter,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(refreshed["data"]["refreshToken"], refresh_token);

    let (status, replay) = post(
        &filter,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay["error"]["code"], "RefreshTokenNotFound");
}

#[tokio::test]
async fn me_and_sessions_require_a_principal() {
    let h = Harness::new();
    let filter = api_v1(&h);
    let registered = register(&filter, "cal@example.com").await;
    let authorization = format!("Bearer {}", registered["data"]["accessToken"].as_str().unwrap());

    let (status, body) = get(&filter, "/api/v1/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "Unauthenticated");

    let (status, me) = get(&filter, "/api/v1/auth/me", Some(&authorization)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["user_id"], registered["data"]["userId"]);
    assert_eq!(me["data"]["email"], "cal@example.com");
    assert_eq!(me["data"]["user_type"], "employer");

    let (status, sessions) = get(&filter, "/api/v1/auth/sessions", Some(&authorization)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions["data"]["activeSessions"], 1);

    let (status, body) = get(&filter, "/api/v1/auth/me", Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TokenSignatureInvalid");
}

#[tokio::test]
async fn logout_revokes_and_repeats_cleanly() {
    let h = Harness::new();
    let filter = api_v1(&h);
    let registered = register(&filter, "dot@example.com").await;
    let data = &registered["data"];
    let authorization = format!("Bearer {}", data["accessToken"].as_str().unwrap());
    let logout_body = json!({"refresh_token": data["refreshToken"], "user_id": data["userId"]});

    for _ in 0..2 {
        let (status, body) = post(
            &filter,
            "/api/v1/auth/logout",
            logout_body.clone(),
            Some(&authorization),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert!(body.get("data").is_none());
    }

    let (status, body) = get(&filter, "/api/v1/auth/me", Some(&authorization)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TokenRevoked");

    // Logging back in with the revoked bearer still attached is fine.
    let (status, body) = post(
        &filter,
        "/api/v1/auth/login",
        json!({"email": "dot@example.com", "password": PASSWORD}),
        Some(&authorization),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = post(&filter, "/api/v1/auth/logout", logout_body, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stale_bearer_does_not_block_refresh_or_login() {
    let h = Harness::new();
    let filter = api_v1(&h);
    let registered = register(&filter, "gus@example.com").await;
    let data = &registered["data"];
    let expired = format!("Bearer {}", data["accessToken"].as_str().unwrap());
    h.advance(ACCESS_TTL + Duration::from_secs(1));

    let (status, body) = get(&filter, "/api/v1/auth/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TokenExpired");

    let (status, refreshed) = post(
        &filter,
        "/api/v1/auth/refresh",
        json!({"refresh_token": data["refreshToken"]}),
        Some(&expired),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{refreshed}");
    let fresh = format!("Bearer {}", refreshed["data"]["accessToken"].as_str().unwrap());
    let (status, _) = get(&filter, "/api/v1/auth/me", Some(&fresh)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &filter,
        "/api/v1/auth/login",
        json!({"email": "gus@example.com", "password": PASSWORD}),
        Some(&expired),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = post(
        &filter,
        "/api/v1/auth/register",
        json!({"email": "hal@example.com", "password": PASSWORD, "userType": "applicant"}),
        Some("Bearer not.a.jwt"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn logout_all_ends_every_refresh_token() {
    let h = Harness::new();
    let filter = api_v1(&h);
    let registered = register(&filter, "eli@example.com").await;
    let user_id = registered["data"]["userId"].clone();

    let (status, _) = post(
        &filter,
        "/api/v1/auth/logout-all",
        json!({"user_id": user_id}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &filter,
        "/api/v1/auth/refresh",
        json!({"refresh_token": registered["data"]["refreshToken"]}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "RefreshTokenNotFound");
}

#[tokio::test]
async fn unreachable_store_is_service_unavailable() {
    let h = Harness::with_kv_store(Arc::new(UnreachableKvStore));
    h.seed_user("fox@example.com").await;
    let filter = api_v1(&h);

    let (status, body) = post(
        &filter,
        "/api/v1/auth/login",
        json!({"email": "fox@example.com", "password": PASSWORD}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UpstreamUnavailable");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let h = Harness::new();
    let filter = api_v1(&h);

    let (status, body) = get(&filter, "/api/v1/auth/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
