/// Builds the gRPC client and server code for `potato.proto` using
/// `tonic-prost-build`.
///
/// # Serde
///
/// Every message of the `potato.v1` package derives `serde::Serialize` and
/// `serde::Deserialize` with camelCase field names so the HTTP/JSON gateway
/// can render and accept them directly. Empty scalar fields are skipped when
/// serializing, and missing fields deserialize to their defaults.
///
/// # Protoc
///
/// A `protoc` from `PROTOC` is used when set, otherwise the vendored binary.
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("potato.v1");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/potato.proto");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let descriptor_path = out_dir.join("potato_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    if env::var_os("PROTOC").is_none() {
        config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);
    }

    config
        .message_attribute(
            ".potato.v1",
            "#[derive(serde::Serialize, serde::Deserialize)]",
        )
        .message_attribute(".potato.v1", "#[serde(rename_all = \"camelCase\", default)]")
        .field_attribute(
            ".potato.v1.GetPotatoesResponse.next_page_token",
            "#[serde(skip_serializing_if = \"String::is_empty\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoesResponse.next_page_index",
            "#[serde(skip_serializing_if = \"Option::is_none\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoesRequest.order_by",
            "#[serde(alias = \"order_by\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoesRequest.page_size",
            "#[serde(alias = \"page_size\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoesRequest.page_token",
            "#[serde(alias = \"page_token\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoesRequest.page_index",
            "#[serde(alias = \"page_index\")]",
        )
        .field_attribute(
            ".potato.v1.GetPotatoRequest.potato_id",
            "#[serde(alias = \"potato_id\")]",
        )
        .file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure().compile_with_config(
        config,
        &["proto/potato.proto"],
        &["proto"],
    )?;
    Ok(())
}
