use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::order::OrderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server wiring problem, never the caller's fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Order(err) => match err {
                OrderError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::InvalidState(_)
                | OrderError::InvalidTransition { .. }
                | OrderError::InvalidTotals { .. }
                | OrderError::InvalidAmount(_)
                | OrderError::SelfPurchase
                | OrderError::UnknownStatus(_) => StatusCode::BAD_REQUEST,
                OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Store details stay in the log, not in the response.
        let message = match self {
            ApiError::Order(OrderError::Store(e)) => {
                tracing::error!(error = %e, "Responding with store failure");
                "An internal error occurred".to_string()
            }
            ApiError::Internal(reason) => {
                tracing::error!(reason = %reason, "Responding with internal error");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::debug!(status = status.as_u16(), error = %other, "Responding with error");
                other.to_string()
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
            "status": status.as_u16(),
        });
        if let ApiError::Order(OrderError::InvalidState(current)) = self {
            body["currentStatus"] = json!(current);
        }

        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::store::StoreError;
    use actix_web::body::to_bytes;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(OrderError::Unauthorized("x".into())), 401),
            (ApiError::from(OrderError::Forbidden("x".into())), 403),
            (ApiError::from(OrderError::NotFound(Uuid::nil())), 404),
            (ApiError::from(OrderError::InvalidState(OrderStatus::Delivered)), 400),
            (ApiError::from(OrderError::SelfPurchase), 400),
            (ApiError::BadRequest("bad id".into()), 400),
            (ApiError::from(OrderError::Store(StoreError::database("boom"))), 500),
            (ApiError::Internal("no state".into()), 500),
        ];

        for (err, code) in cases {
            assert_eq!(err.status_code().as_u16(), code, "{err}");
        }
    }

    #[actix_web::test]
    async fn test_invalid_state_body_carries_current_status() {
        let err = ApiError::from(OrderError::InvalidState(OrderStatus::Delivered));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["status"], 400);
        assert_eq!(json["currentStatus"], "delivered");
        assert!(json["message"].as_str().unwrap().contains("delivered"));
    }

    #[actix_web::test]
    async fn test_store_failures_are_not_leaked() {
        let err = ApiError::from(OrderError::Store(StoreError::database("node 10.0.0.3 timed out")));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], 500);
        assert!(!json["message"].as_str().unwrap().contains("10.0.0.3"));
    }
}
