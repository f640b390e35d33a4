//! Remote verification service access.
//!
//! [`Transport`] is the HTTP seam: [`HttpTransport`] talks to the real service,
//! [`ScriptedTransport`] replays canned responses. [`ApiClient`] layers URL
//! building, status handling, and JSON decoding on top of either.

pub mod client;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::{encode_path_segment, ApiClient};
pub use scripted::ScriptedTransport;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
