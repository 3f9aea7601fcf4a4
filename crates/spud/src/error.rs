//! Error kinds produced by the ordering and pagination engines.
//!
//! Every variant is a request-level validation failure. Nothing here is
//! transient, so callers report these errors back to the client verbatim
//! instead of retrying.

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Structured description of a single invalid request field.
///
/// Carried by [`Error::InvalidArgument`] so transport layers can surface
/// precise per-field feedback (for example as a `google.rpc.BadRequest`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Client-facing name of the offending field, e.g. `pageSize`.
    pub field: &'static str,
    /// Human readable explanation of what is wrong with the field.
    pub description: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, description: impl Into<String>) -> Self {
        Self {
            field,
            description: description.into(),
        }
    }
}

/// All errors that ordering or pagination can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The order key does not name any field of the record type.
    #[error("field {field} not found")]
    FieldNotFound { field: String },

    /// Pagination input was malformed (negative size, unparsable selector).
    #[error("{message}")]
    InvalidArgument {
        message: &'static str,
        violation: FieldViolation,
    },

    /// The page selector points past the last page of the collection.
    #[error("{message}")]
    OutOfRange { message: &'static str },
}

impl Error {
    pub(crate) fn field_not_found(field: &str) -> Self {
        Self::FieldNotFound {
            field: field.to_string(),
        }
    }

    pub(crate) fn negative_page_size(page_size: i64) -> Self {
        Self::InvalidArgument {
            message: "pageSize must be non-negative",
            violation: FieldViolation::new(
                "pageSize",
                format!("The page size must not be negative, got {page_size}"),
            ),
        }
    }

    pub(crate) fn invalid_selector(field: &'static str, description: String) -> Self {
        Self::InvalidArgument {
            message: "page selector must be a valid page reference",
            violation: FieldViolation::new(field, description),
        }
    }

    pub(crate) fn page_out_of_range() -> Self {
        Self::OutOfRange {
            message: "page selector out of bounds",
        }
    }

    /// Returns the field violation attached to this error, if any.
    pub fn violation(&self) -> Option<&FieldViolation> {
        match self {
            Self::InvalidArgument { violation, .. } => Some(violation),
            _ => None,
        }
    }
}
