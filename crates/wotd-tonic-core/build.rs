/// Builds the gRPC client and server code for `mywordoftheday.proto` using
/// `tonic-prost-build`.
///
/// Generated bindings land in the crate's `OUT_DIR` together with an encoded
/// file descriptor set, which the server registers with gRPC reflection.
///
/// # Panics
///
/// Panics if code generation fails (for example when `protoc` is missing).
///
/// # Output
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("mywordoftheday.v1alpha1");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("mywordoftheday_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(
            config,
            &["proto/mywordoftheday/v1alpha1/mywordoftheday.proto"],
            &["proto"],
        )
        .unwrap();
}
