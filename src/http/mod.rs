//! HTTP protocol layer module
//!
//! Protocol-level helpers decoupled from business logic: response builders,
//! percent-decoding and query parsing, `ETag` handling, and MIME lookup.

pub mod cache;
pub mod mime;
pub mod query;
pub mod response;

// Re-export commonly used functions
pub use query::{percent_decode, query_param};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_options_response, build_temporary_redirect,
};
