//! # MirrorPost Shared
//!
//! Request and response bodies of the indexer's HTTP API, kept free of
//! server-side types so clients can depend on them directly.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
