//! Staff departure-board feed.
//!
//! DTOs for the JSON schema subset the cache consumes, plus the HTTP
//! client that fetches the departure board and the reason-code reference
//! feed. The staff feed omits fields freely and sends explicit nulls, so
//! every field is an `Option` with defaulting applied at hydration time,
//! never during parsing.
//!
//! The client mints a strictly-increasing snapshot version per departures
//! fetch; the board rejects any ingestion that would roll that back.

mod client;
mod error;
mod types;

pub use client::{FeedClient, FeedConfig, FetchedSnapshot};
pub use error::FeedError;
pub use types::{
    CallingLocation, EndpointLocation, Formation, LoadingPercentage, NrccMessage, ReasonField,
    ServiceLoading, StationBoard, TrainService,
};
