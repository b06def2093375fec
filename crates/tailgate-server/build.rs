use tonic_build::manual::{Builder, Method, Service};

// Messages are plain prost structs in `src/api/mod.rs`; only the service plumbing is generated,
// so the build does not need `protoc`.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let service = Service::builder()
        .name("ProfileLog")
        .package("tailgate.v1")
        .method(unary(
            "create_profile",
            "CreateProfile",
            "CreateProfileRequest",
            "CreateProfileResponse",
        ))
        .method(unary("read_profile", "ReadProfile", "ReadProfileRequest", "ReadProfileResponse"))
        .method(unary(
            "update_profile",
            "UpdateProfile",
            "UpdateProfileRequest",
            "UpdateProfileResponse",
        ))
        .method(unary(
            "delete_profile",
            "DeleteProfile",
            "DeleteProfileRequest",
            "DeleteProfileResponse",
        ))
        .method(unary(
            "list_profiles",
            "ListProfiles",
            "ListProfilesRequest",
            "ListProfilesResponse",
        ))
        .method(unary("produce", "Produce", "ProduceRequest", "ProduceResponse"))
        .method(unary("consume", "Consume", "ConsumeRequest", "ConsumeResponse"))
        .method(
            builder("produce_stream", "ProduceStream", "ProduceRequest", "ProduceResponse")
                .client_streaming()
                .server_streaming()
                .build(),
        )
        .method(
            builder("consume_stream", "ConsumeStream", "ConsumeRequest", "ConsumeResponse")
                .server_streaming()
                .build(),
        )
        .build();

    Builder::new().compile(&[service]);
}

fn builder(
    name: &str,
    route: &str,
    input: &str,
    output: &str,
) -> tonic_build::manual::MethodBuilder {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::api::{input}"))
        .output_type(format!("crate::api::{output}"))
        .codec_path("tonic::codec::ProstCodec")
}

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    builder(name, route, input, output).build()
}
