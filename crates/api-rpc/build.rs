// Generates the Tag Service messages, gRPC server/client and the reflection
// descriptor from proto/.

use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let proto_root = manifest_dir.join("../../proto");
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let protos = [
        proto_root.join("tag_service.proto"),
        proto_root.join("google/rpc/status.proto"),
    ];
    for proto in &protos {
        println!("cargo:rerun-if-changed={}", proto.display());
    }

    // Fall back to the bundled protoc (and its well-known types) when none is configured
    let mut includes = vec![proto_root.clone()];
    if env::var_os("PROTOC").is_none() {
        env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
        includes.push(protoc_bin_vendored::include_path()?);
    }

    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("tag_service_descriptor.bin"))
        .type_attribute(".tag_service", "#[derive(serde::Serialize, serde::Deserialize)]")
        .type_attribute(".tag_service.GetTagRequest", "#[serde(default)]")
        .type_attribute(".tag_service.GetTagListRequest", "#[serde(default)]")
        .type_attribute(".tag_service.CreateTagRequest", "#[serde(default)]")
        .compile_protos(&protos, &includes)?;
    Ok(())
}
