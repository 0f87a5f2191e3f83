// crates/client/src/lib.rs
//! Client for the podsum audio-summarization backend.
//!
//! One submission runs in three strictly ordered steps (presigned-URL
//! credential, byte transfer, job registration), then a fixed-interval poll
//! loop watches the job until a terminal state, and finally the
//! double-encoded summary payload is unwrapped into [`podsum_types::SummaryData`].
//! [`session::Session`] ties the pieces together behind a single state
//! machine.

pub mod api;
pub mod config;
pub mod decode;
pub mod error;
pub mod media;
pub mod poller;
pub mod session;

pub use api::*;
pub use config::*;
pub use decode::*;
pub use error::*;
pub use media::*;
pub use poller::*;
pub use session::*;
