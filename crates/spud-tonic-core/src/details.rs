//! Rich gRPC error details.
//!
//! gRPC transports structured error details in the `grpc-status-details-bin`
//! trailer as an encoded `google.rpc.Status` whose `details` are `Any`
//! messages. This module defines the subset of `google/rpc/status.proto` and
//! `google/rpc/error_details.proto` the service uses, and helpers to attach
//! them to and read them back from a [`tonic::Status`].

use bytes::Bytes;
use prost::Message;
use prost_types::Any;
use tonic::{Code, Status};

/// Type URL of an `Any`-packed [`BadRequest`].
pub const BAD_REQUEST_TYPE_URL: &str = "type.googleapis.com/google.rpc.BadRequest";

/// `google.rpc.Status`.
#[derive(Clone, PartialEq, Message)]
pub struct RpcStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<Any>,
}

/// `google.rpc.BadRequest`.
#[derive(Clone, PartialEq, Message)]
pub struct BadRequest {
    #[prost(message, repeated, tag = "1")]
    pub field_violations: Vec<FieldViolation>,
}

/// `google.rpc.BadRequest.FieldViolation`.
#[derive(Clone, PartialEq, Message)]
pub struct FieldViolation {
    #[prost(string, tag = "1")]
    pub field: String,
    #[prost(string, tag = "2")]
    pub description: String,
}

impl From<&spud::FieldViolation> for FieldViolation {
    fn from(v: &spud::FieldViolation) -> Self {
        Self {
            field: v.field.to_string(),
            description: v.description.clone(),
        }
    }
}

impl BadRequest {
    pub fn single(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field_violations: vec![FieldViolation {
                field: field.into(),
                description: description.into(),
            }],
        }
    }
}

/// Builds a [`Status`] carrying `bad_request` in its details.
///
/// # Panics
///
/// Panics if the details cannot be encoded. Encoding into a buffer sized by
/// `encoded_len` cannot fail, so a failure here is a defect in the message
/// definitions rather than a request error.
pub fn status_with_bad_request(
    code: Code,
    message: impl Into<String>,
    bad_request: &BadRequest,
) -> Status {
    let message = message.into();
    let status = RpcStatus {
        code: code as i32,
        message: message.clone(),
        details: vec![Any {
            type_url: BAD_REQUEST_TYPE_URL.to_string(),
            value: bad_request.encode_to_vec(),
        }],
    };

    let mut buf = Vec::with_capacity(status.encoded_len());
    if let Err(e) = status.encode(&mut buf) {
        panic!("unexpected error attaching status details: {e}");
    }
    Status::with_details(code, message, Bytes::from(buf))
}

/// Decodes the [`BadRequest`] attached to `status`, if any.
pub fn bad_request(status: &Status) -> Option<BadRequest> {
    if status.details().is_empty() {
        return None;
    }
    let rpc = RpcStatus::decode(status.details()).ok()?;
    rpc.details
        .iter()
        .find(|any| any.type_url == BAD_REQUEST_TYPE_URL)
        .and_then(|any| BadRequest::decode(any.value.as_slice()).ok())
}
