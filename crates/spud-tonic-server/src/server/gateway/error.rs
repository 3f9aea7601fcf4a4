//! Translation of gRPC failures into HTTP/JSON error responses.
//!
//! The body mirrors the JSON rendering of `google.rpc.Status`:
//!
//! ```json
//! {
//!   "code": 3,
//!   "message": "pageSize must be non-negative",
//!   "details": [{
//!     "@type": "type.googleapis.com/google.rpc.BadRequest",
//!     "fieldViolations": [{ "field": "pageSize", "description": "..." }]
//!   }]
//! }
//! ```

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use spud_tonic_core::details::{BAD_REQUEST_TYPE_URL, BadRequest, bad_request};
use tonic::{Code, Status};

/// The gRPC message of a failed gateway response, for request logs.
#[derive(Clone, Debug)]
pub struct GatewayFailure(pub String);

/// A gRPC [`Status`] returned to an HTTP client.
#[derive(Debug)]
pub struct GatewayError(Status);

impl From<Status> for GatewayError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        let body = rejection.body_text();
        let status = spud_tonic_core::details::status_with_bad_request(
            Code::InvalidArgument,
            "query string could not be parsed",
            &BadRequest::single("query", body),
        );
        Self(status)
    }
}

/// Maps a gRPC status code onto the HTTP status a JSON client receives.
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::Unknown | Code::Internal | Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bad_request_json(details: &BadRequest) -> Value {
    let violations: Vec<Value> = details
        .field_violations
        .iter()
        .map(|v| json!({ "field": v.field, "description": v.description }))
        .collect();
    json!({ "@type": BAD_REQUEST_TYPE_URL, "fieldViolations": violations })
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let details: Vec<Value> = bad_request(&self.0).iter().map(bad_request_json).collect();
        let body = json!({
            "code": self.0.code() as i32,
            "message": self.0.message(),
            "details": details,
        });

        let mut response = (http_status(self.0.code()), Json(body)).into_response();
        response
            .extensions_mut()
            .insert(GatewayFailure(self.0.message().to_string()));
        response
    }
}
