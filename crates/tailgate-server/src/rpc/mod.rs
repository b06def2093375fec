//! gRPC surface: the `ProfileLog` service and the error -> status mapping.

pub mod service;
pub mod status;

pub use service::ProfileLogService;
pub use status::to_status;
