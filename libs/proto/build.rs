//! Generates the `UsersService` client and server stubs.
//!
//! Messages are declared with prost derives in `src/lib.rs`, so only the
//! service plumbing is generated here and no `protoc` is needed.

use tonic_build::manual::{Builder, Method, Service};

fn method(name: &str, route_name: &str, input_type: &str, output_type: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route_name)
        .input_type(input_type)
        .output_type(output_type)
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    let service = Service::builder()
        .name("UsersService")
        .package("users")
        .method(method(
            "get_users",
            "GetUsers",
            "crate::GetUsersRequest",
            "crate::GetUsersResponse",
        ))
        .method(method(
            "get_user_by_id",
            "GetUserById",
            "crate::GetUserByIdRequest",
            "crate::GetUserByIdResponse",
        ))
        .method(method(
            "insert_user",
            "InsertUser",
            "crate::InsertRequest",
            "crate::InsertResponse",
        ))
        .method(method(
            "update_user",
            "UpdateUser",
            "crate::UpdateRequest",
            "crate::UpdateResponse",
        ))
        .method(method(
            "delete_user",
            "DeleteUser",
            "crate::DeleteRequest",
            "crate::DeleteResponse",
        ))
        .build();

    Builder::new().compile(&[service]);

    println!("cargo:rerun-if-changed=build.rs");
}
