//! Thin HTTP client layer: a base URL, a header set, and verb methods.
//!
//! # Overview
//! `ApiManager` owns a `Config` and forwards `get`/`put`/`patch`/`post`/
//! `delete` to the dispatcher, which builds the URL by plain concatenation,
//! attaches the configured headers, encodes the body and hands the request
//! to a `Transport`. The response body is decoded as JSON and returned as a
//! `serde_json::Value`.
//!
//! # Design
//! - The dispatcher is a set of free functions generic over `ConfigReader`
//!   and `Transport`; it keeps no state.
//! - `build_request` is pure, so request construction is testable without a
//!   server. Only `Transport::send` touches the network.
//! - No retries, no status interpretation, no error translation: transport
//!   and decode failures reach the caller as they were produced.
//! - Header maps are shared handles. A configuration snapshot exposes the
//!   live map, not a copy.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod headers;
pub mod http;
pub mod manager;
pub mod transport;

pub use config::{Config, ConfigReader, ConfigSnapshot};
pub use dispatch::{
    api_request, build_request, delete_handler, get_handler, patch_handler, post_handler, put_handler, Body,
};
pub use error::{ApiError, Result};
pub use headers::{HeaderValue, Headers};
pub use http::{HttpMethod, HttpRequest, HttpResponse, UnknownMethod};
pub use manager::{ApiManager, ApiOptions};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::{Transport, TransportError};
