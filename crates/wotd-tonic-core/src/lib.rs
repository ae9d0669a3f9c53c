#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

/// gRPC service and message definitions generated from
/// `proto/mywordoftheday/v1alpha1/mywordoftheday.proto`.
pub mod proto {
    tonic::include_proto!("mywordoftheday.v1alpha1");

    /// Encoded descriptor set for registering the service with gRPC
    /// reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("mywordoftheday_descriptor");
}
