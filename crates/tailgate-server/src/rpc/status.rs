//! Domain error -> gRPC status.
//!
//! Every status carries a `google.rpc.LocalizedMessage` detail next to the code, so clients get
//! a structured, human-readable explanation instead of a bare string.

use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

use tailgate_core::error::{ClientCode, TailgateError, DETAIL_LOCALE};

pub fn code_for(code: ClientCode) -> Code {
    match code {
        ClientCode::Unauthenticated => Code::Unauthenticated,
        ClientCode::Unknown => Code::Unknown,
        ClientCode::PermissionDenied => Code::PermissionDenied,
        ClientCode::NotFound => Code::NotFound,
        ClientCode::OutOfRange => Code::OutOfRange,
        ClientCode::FailedPrecondition => Code::FailedPrecondition,
        ClientCode::InvalidArgument => Code::InvalidArgument,
        ClientCode::Unavailable => Code::Unavailable,
        ClientCode::Internal => Code::Internal,
    }
}

pub fn to_status(err: &TailgateError) -> Status {
    let details = ErrorDetails::with_localized_message(DETAIL_LOCALE, err.localized_message());
    Status::with_error_details(code_for(err.client_code()), err.to_string(), details)
}

/// Shorthand for request validation failures.
pub fn invalid_argument(msg: impl Into<String>) -> Status {
    to_status(&TailgateError::InvalidArgument(msg.into()))
}
