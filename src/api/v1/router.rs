use super::error::*;
use super::handler;
use crate::application_port::*;
use crate::domain_model::*;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const AUTHORIZATION: &str = "authorization";

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // Only `me` and `sessions` consume an identity. The rest must keep working
    // for a caller still sending an expired or revoked bearer; logout reads
    // the header itself.
    let register = warp::path("register")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::register);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::login);

    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::refresh);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::<String>(AUTHORIZATION))
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::logout);

    let logout_all = warp::path("logout-all")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::logout_all);

    let me = warp::path("me")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_principal(server.authenticator.clone()))
        .and_then(handler::me);

    let sessions = warp::path("sessions")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_principal(server.authenticator.clone()))
        .and(with(server.session_manager.clone()))
        .and_then(handler::sessions);

    warp::path("auth").and(
        register
            .or(login)
            .or(refresh)
            .or(logout)
            .or(logout_all)
            .or(me)
            .or(sessions),
    )
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Runs the bearer check when the request carries one. Anonymous callers
/// pass; bad tokens are rejected.
pub fn with_identity(
    authenticator: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (CallerIdentity,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(AUTHORIZATION).and_then(
        move |authorization: Option<String>| {
            let authenticator = authenticator.clone();
            async move {
                authenticator
                    .authenticate(authorization.as_deref())
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)
            }
        },
    )
}

fn with_principal(
    authenticator: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (Principal,), Error = warp::Rejection> + Clone {
    with_identity(authenticator).and_then(|identity: CallerIdentity| async move {
        match identity {
            CallerIdentity::Authenticated(principal) => Ok(principal),
            CallerIdentity::Anonymous => Err(reject::custom(ApiErrorCode::Unauthenticated)),
        }
    })
}
