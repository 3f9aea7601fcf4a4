#![doc = include_str!("../README.md")]

pub mod details;
pub mod error;
pub mod record;

pub use error::{Error, Result};
// Public re-export so downstream crates can reach the query engine via
// `spud_tonic_core::spud`
pub use spud;

/// gRPC service and message definitions generated from `proto/potato.proto`.
pub mod proto {
    tonic::include_proto!("potato.v1");
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("potato_descriptor");
}
