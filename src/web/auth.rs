use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use super::{ApiError, AppState};
use crate::identity::Caller;

/// Caller resolved from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller(pub Caller);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

impl FromRequest for AuthenticatedCaller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing from request; routes misconfigured");
            return ready(Err(ApiError::Internal("application state not registered".to_string())));
        };

        let result = state
            .manager
            .authenticate(bearer_token(req))
            .map(AuthenticatedCaller)
            .map_err(ApiError::from);

        if let Err(e) = &result {
            tracing::warn!(path = %req.path(), error = %e, "Rejected request credential");
        }
        ready(result)
    }
}
