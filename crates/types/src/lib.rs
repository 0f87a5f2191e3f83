// crates/types/src/lib.rs
//! Wire types shared between the podsum client and CLI: job lifecycle
//! records for the backend's REST surface and the structured summary model.

pub mod job;
pub mod summary;

pub use job::*;
pub use summary::*;
