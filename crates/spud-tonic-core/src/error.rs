//! Error types for the potato service.
//!
//! This module defines the central `Error` enum, which captures every
//! reportable failure of a potato request. It implements `From<Error>` for
//! `tonic::Status` so handlers can propagate errors with `?` and clients
//! receive the matching gRPC code. Validation failures carry a
//! `google.rpc.BadRequest` in the status details.
//!
//! ## Error Cases
//! - `Query`: ordering or pagination rejected the request (see
//!   [`spud::Error`]).
//! - `InvalidRequest`: a request field outside the query engine was invalid.
//! - `NotFound`: no potato with the requested identifier.
//! - `Internal`: a response could not be assembled.

use crate::details::{BadRequest, FieldViolation, status_with_bad_request};
use tonic::{Code, Status};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the potato service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The ordering or pagination engine rejected the query.
    #[error(transparent)]
    Query(#[from] spud::Error),

    /// The client request was malformed.
    #[error("Invalid request: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    /// The requested potato does not exist.
    #[error("potato {id} not found")]
    NotFound { id: String },

    /// The response could not be built from otherwise valid input.
    #[error("Internal error: {context}")]
    Internal { context: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Query(spud::Error::FieldNotFound { field }) => {
                let message = format!("field {field} not found");
                let bad_request = BadRequest::single(
                    "orderBy",
                    format!("`{field}` is not an orderable potato field"),
                );
                status_with_bad_request(Code::InvalidArgument, message, &bad_request)
            }
            Error::Query(spud::Error::InvalidArgument { message, violation }) => {
                let bad_request = BadRequest {
                    field_violations: vec![FieldViolation::from(&violation)],
                };
                status_with_bad_request(Code::InvalidArgument, message, &bad_request)
            }
            Error::Query(spud::Error::OutOfRange { message }) => Status::out_of_range(message),
            Error::Query(other) => Status::invalid_argument(other.to_string()),
            Error::InvalidRequest { field, reason } => {
                let bad_request = BadRequest::single(field, reason.clone());
                status_with_bad_request(Code::InvalidArgument, reason, &bad_request)
            }
            Error::NotFound { id } => Status::not_found(format!("potato {id} not found")),
            Error::Internal { context } => Status::internal(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::bad_request;
    use spud::{PageSelector, order_by, paginate};

    fn violation_field(status: &Status) -> String {
        bad_request(status).unwrap().field_violations[0].field.clone()
    }

    #[test]
    fn unknown_field_is_invalid_argument_on_order_by() {
        let err: Error = order_by(Vec::<crate::proto::Potato>::from([Default::default()]), "x")
            .unwrap_err()
            .into();
        let status = Status::from(err);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "field x not found");
        assert_eq!(violation_field(&status), "orderBy");
    }

    #[test]
    fn negative_page_size_keeps_violation() {
        let err: Error = paginate(vec![1, 2, 3], -2, PageSelector::First)
            .unwrap_err()
            .into();
        let status = Status::from(err);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "pageSize must be non-negative");
        assert_eq!(violation_field(&status), "pageSize");
    }

    #[test]
    fn bad_token_names_the_token_field() {
        let err: Error = paginate(vec![1, 2, 3], 1, PageSelector::Token("zz"))
            .unwrap_err()
            .into();
        let status = Status::from(err);
        assert_eq!(
            status.message(),
            "page selector must be a valid page reference"
        );
        assert_eq!(violation_field(&status), "pageToken");
    }

    #[test]
    fn out_of_range_maps_to_out_of_range() {
        let err: Error = paginate(vec![1, 2, 3], 1, PageSelector::Index(3))
            .unwrap_err()
            .into();
        let status = Status::from(err);
        assert_eq!(status.code(), Code::OutOfRange);
        assert_eq!(status.message(), "page selector out of bounds");
        assert!(bad_request(&status).is_none());
    }

    #[test]
    fn service_errors_map_to_codes() {
        let status = Status::from(Error::NotFound { id: "9".into() });
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "potato 9 not found");

        let status = Status::from(Error::InvalidRequest {
            field: "potatoId",
            reason: "potatoId must not be empty".into(),
        });
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(violation_field(&status), "potatoId");

        let status = Status::from(Error::Internal {
            context: "boom".into(),
        });
        assert_eq!(status.code(), Code::Internal);
    }
}
