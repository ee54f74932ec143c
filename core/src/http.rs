//! HTTP request and response types exchanged with the transport.
//!
//! # Design
//! These types describe one outbound request and its response as plain data.
//! The dispatcher builds an `HttpRequest` without touching the network and
//! hands it to a `Transport`; whatever the transport returns comes back as an
//! `HttpResponse` and is decoded here. Keeping both sides as owned data means
//! request construction can be tested without a server.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;
use crate::headers::HeaderValue;

/// HTTP method for a request.
///
/// The set is closed so a mistyped verb never reaches the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl HttpMethod {
    /// Upper-case method text as it goes on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a method name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-sensitive: `"get"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `headers: None` means the configuration carried no header map at all,
/// which is different from an empty one. `body: None` means the request is
/// sent without a body, not with an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Option<Vec<(String, HeaderValue)>>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Headers that actually go on the wire, in order. Absent values are skipped.
    pub fn wire_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .flatten()
            .filter_map(|(name, value)| value.to_wire().map(|v| (name.clone(), v)))
            .collect()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Decode the body as JSON. The status code is not consulted.
    pub fn json(&self) -> Result<serde_json::Value, ApiError> {
        serde_json::from_str(&self.body).map_err(ApiError::Decode)
    }
}
