//! Wire contract for `tailgate.v1.ProfileLog`.
//!
//! Messages are hand-written prost structs; the client/server stubs are generated by `build.rs`
//! and included below. Conversions to and from the core types live here too, so handlers only
//! deal with domain values.

use std::collections::HashMap;

use bytes::Bytes;
use tailgate_core::{ProfileRecord, Record as LogRecord};

include!(concat!(env!("OUT_DIR"), "/tailgate.v1.ProfileLog.rs"));

pub use profile_log_client::ProfileLogClient;
pub use profile_log_server::{ProfileLog, ProfileLogServer};

#[derive(Clone, PartialEq, prost::Message)]
pub struct Profile {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(map = "string, string", tag = "3")]
    pub attributes: HashMap<String, String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Record {
    #[prost(uint64, tag = "1")]
    pub offset: u64,
    #[prost(bytes = "bytes", tag = "2")]
    pub value: Bytes,
    #[prost(message, optional, tag = "3")]
    pub appended_at: Option<prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateProfileResponse {
    #[prost(message, optional, tag = "1")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadProfileRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadProfileResponse {
    #[prost(message, optional, tag = "1")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateProfileResponse {
    #[prost(message, optional, tag = "1")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteProfileRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct DeleteProfileResponse {
    #[prost(bool, tag = "1")]
    pub deleted: bool,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ListProfilesRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListProfilesResponse {
    #[prost(message, repeated, tag = "1")]
    pub profiles: Vec<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProduceRequest {
    #[prost(message, optional, tag = "1")]
    pub record: Option<Record>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ProduceResponse {
    #[prost(uint64, tag = "1")]
    pub offset: u64,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ConsumeRequest {
    #[prost(uint64, tag = "1")]
    pub offset: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ConsumeResponse {
    #[prost(message, optional, tag = "1")]
    pub record: Option<Record>,
}

// --------------------
// Domain conversions
// --------------------

impl From<Profile> for ProfileRecord {
    fn from(p: Profile) -> Self {
        ProfileRecord {
            id: p.id,
            name: p.name,
            attributes: p.attributes.into_iter().collect(),
        }
    }
}

impl From<ProfileRecord> for Profile {
    fn from(p: ProfileRecord) -> Self {
        Profile {
            id: p.id,
            name: p.name,
            attributes: p.attributes.into_iter().collect(),
        }
    }
}

impl From<LogRecord> for Record {
    fn from(r: LogRecord) -> Self {
        Record {
            offset: r.offset,
            value: r.payload,
            appended_at: Some(prost_types::Timestamp::from(r.appended_at)),
        }
    }
}
