//! Wire protocol for the controller core: tagged request/response records,
//! the status message envelope, and the codec (C1) that dispatches a
//! generic response dictionary onto the closed response enum.
//!
//! This crate performs no I/O; see `controller-core` for the transport,
//! supervisor, and orchestration logic built on top of these types.

pub mod codec;
pub mod error;
pub mod request;
pub mod response;
pub mod status;
pub mod types;

pub use error::ParseError;
pub use request::{RequestRecord, RequestSeries};
pub use response::{ResponseRecord, ResponseSeries};
pub use status::{Severity, StatusMessage};
