//! Turns (configuration, method, endpoint, body) into one transport call.
//!
//! # Design
//! Everything here is a free function; the dispatcher keeps no state.
//! `build_request` is pure and does all the policy work: URL concatenation,
//! header pass-through and body encoding. `api_request` adds the round-trip
//! and JSON decoding, and the per-verb helpers pin the method and check their
//! arguments.
//!
//! The URL is `base_url + endpoint` with no normalization. A missing base URL
//! is rendered as the text `"null"`, so `endpoint = "/users"` with no base URL
//! targets `"null/users"`; the transport is expected to reject it.

use serde::Serialize;
use serde_json::Value;

use crate::config::ConfigReader;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Already serialized; sent verbatim.
    Text(String),
    /// Structured value; serialized to JSON text before sending.
    Json(Value),
}

impl Body {
    /// Structured body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(ApiError::Serialization)
    }

    /// Wire text for this body, or `None` when nothing should be sent.
    ///
    /// A JSON string is already text and is not quoted again. JSON `null`
    /// counts as no body.
    pub fn encode(self) -> Result<Option<String>> {
        match self {
            Body::Text(text) => Ok(Some(text)),
            Body::Json(Value::Null) => Ok(None),
            Body::Json(Value::String(text)) => Ok(Some(text)),
            Body::Json(value) => serde_json::to_string(&value)
                .map(Some)
                .map_err(ApiError::Serialization),
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

/// Build the outbound request without sending it.
pub fn build_request<C>(
    config: &C,
    method: HttpMethod,
    endpoint: &str,
    body: Option<Body>,
) -> Result<HttpRequest>
where
    C: ConfigReader + ?Sized,
{
    let base_url = config.base_url();
    let url = format!("{}{endpoint}", base_url.as_deref().unwrap_or("null"));
    let headers = config.headers().map(|headers| headers.entries());
    let body = match body {
        Some(body) => body.encode()?,
        None => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Send one request and decode the response body as JSON.
///
/// Transport and decode failures come back exactly as produced.
pub async fn api_request<T, C>(
    transport: &T,
    config: &C,
    method: HttpMethod,
    endpoint: &str,
    body: Option<Body>,
) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let request = build_request(config, method, endpoint, body)?;
    tracing::debug!(%method, url = %request.url, has_body = request.body.is_some(), "dispatching request");

    let response = transport.send(request).await.map_err(|err| {
        tracing::warn!(%method, error = %err, "transport failed");
        ApiError::Transport(err)
    })?;

    response.json().inspect_err(|err| {
        tracing::debug!(%method, status = response.status, error = %err, "response was not JSON");
    })
}

fn require<'a, C: ?Sized>(endpoint: Option<&'a str>, config: Option<&'a C>) -> Result<(&'a str, &'a C)> {
    match (endpoint, config) {
        (Some(endpoint), Some(config)) => Ok((endpoint, config)),
        _ => Err(ApiError::MissingArgument),
    }
}

pub async fn get_handler<T, C>(transport: &T, endpoint: Option<&str>, config: Option<&C>) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let (endpoint, config) = require(endpoint, config)?;
    api_request(transport, config, HttpMethod::Get, endpoint, None).await
}

pub async fn put_handler<T, C>(
    transport: &T,
    endpoint: Option<&str>,
    data: Option<Body>,
    config: Option<&C>,
) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let (endpoint, config) = require(endpoint, config)?;
    api_request(transport, config, HttpMethod::Put, endpoint, data).await
}

pub async fn post_handler<T, C>(
    transport: &T,
    endpoint: Option<&str>,
    data: Option<Body>,
    config: Option<&C>,
) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let (endpoint, config) = require(endpoint, config)?;
    api_request(transport, config, HttpMethod::Post, endpoint, data).await
}

pub async fn patch_handler<T, C>(
    transport: &T,
    endpoint: Option<&str>,
    data: Option<Body>,
    config: Option<&C>,
) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let (endpoint, config) = require(endpoint, config)?;
    api_request(transport, config, HttpMethod::Patch, endpoint, data).await
}

pub async fn delete_handler<T, C>(transport: &T, endpoint: Option<&str>, config: Option<&C>) -> Result<Value>
where
    T: Transport + ?Sized,
    C: ConfigReader + ?Sized,
{
    let (endpoint, config) = require(endpoint, config)?;
    api_request(transport, config, HttpMethod::Delete, endpoint, None).await
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::RecordingTransport;
    use super::*;
    use crate::config::Config;
    use crate::headers::{HeaderValue, Headers};
    use crate::transport::TransportError;

    fn config() -> Config {
        let headers: Headers = [("Authorization", "Bearer t")].into_iter().collect();
        Config::new(Some("https://api.example.com".to_string()), Some(headers))
    }

    #[test]
    fn get_request_has_no_body() {
        let req = build_request(&config(), HttpMethod::Get, "/users", None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/users");
        assert_eq!(
            req.headers,
            Some(vec![("Authorization".to_string(), HeaderValue::from("Bearer t"))])
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn structured_body_is_serialized() {
        let body = Body::Json(json!({"foo": "bar"}));
        let req = build_request(&config(), HttpMethod::Post, "/users", Some(body)).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"foo":"bar"}"#));
    }

    #[test]
    fn text_body_passes_through() {
        let raw = r#"{"name":"Bob"}"#;
        let req = build_request(&config(), HttpMethod::Put, "/users/1", Some(Body::from(raw))).unwrap();
        assert_eq!(req.body.as_deref(), Some(raw));
    }

    #[test]
    fn json_string_is_not_quoted_again() {
        let req = build_request(&config(), HttpMethod::Post, "/x", Some(Body::Json(json!("raw")))).unwrap();
        assert_eq!(req.body.as_deref(), Some("raw"));
    }

    #[test]
    fn json_null_means_no_body() {
        let req = build_request(&config(), HttpMethod::Patch, "/x", Some(Body::Json(Value::Null))).unwrap();
        assert!(req.body.is_none());
    }

    #[test]
    fn empty_object_and_array_are_serialized() {
        let req = build_request(&config(), HttpMethod::Post, "/x", Some(Body::Json(json!({})))).unwrap();
        assert_eq!(req.body.as_deref(), Some("{}"));
        let req = build_request(&config(), HttpMethod::Post, "/x", Some(Body::Json(json!([1, 2])))).unwrap();
        assert_eq!(req.body.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn empty_text_is_sent_as_empty_body() {
        let req = build_request(&config(), HttpMethod::Post, "/x", Some(Body::from(""))).unwrap();
        assert_eq!(req.body.as_deref(), Some(""));
    }

    #[test]
    fn missing_base_url_renders_as_null() {
        let req = build_request(&Config::default(), HttpMethod::Get, "/users", None).unwrap();
        assert_eq!(req.url, "null/users");
        assert!(req.headers.is_none());
    }

    #[test]
    fn url_is_plain_concatenation() {
        let config = Config::new(Some("https://api.example.com/".to_string()), None);
        let req = build_request(&config, HttpMethod::Get, "users", None).unwrap();
        assert_eq!(req.url, "https://api.example.com/users");
        let req = build_request(&config, HttpMethod::Get, "/users", None).unwrap();
        assert_eq!(req.url, "https://api.example.com//users");
        let req = build_request(&config, HttpMethod::Get, "", None).unwrap();
        assert_eq!(req.url, "https://api.example.com/");
    }

    #[test]
    fn body_json_serializes_structs() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
        }
        let body = Body::json(&Payload { name: "Alice" }).unwrap();
        assert_eq!(body.encode().unwrap().as_deref(), Some(r#"{"name":"Alice"}"#));
    }

    #[test]
    fn struct_fields_keep_declaration_order() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
            age: u32,
            active: bool,
        }
        let body = Body::json(&User { name: "Alice", age: 30, active: true }).unwrap();
        let req = build_request(&config(), HttpMethod::Post, "/users", Some(body)).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Alice","age":30,"active":true}"#));
    }

    #[test]
    fn object_keys_keep_written_order() {
        let body = Body::Json(json!({"z": 1, "a": 2, "m": {"y": true, "b": false}}));
        let req = build_request(&config(), HttpMethod::Put, "/x", Some(body)).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"z":1,"a":2,"m":{"y":true,"b":false}}"#));
    }

    #[tokio::test]
    async fn decoded_response_keeps_key_order() {
        let transport = RecordingTransport::default();
        transport.respond_with(r#"{"zeta":1,"alpha":2}"#);
        let value = api_request(&transport, &config(), HttpMethod::Get, "/x", None)
            .await
            .unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn body_json_rejects_non_string_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], "x");
        assert!(matches!(Body::json(&map).unwrap_err(), ApiError::Serialization(_)));
    }

    #[tokio::test]
    async fn api_request_returns_decoded_json() {
        let transport = RecordingTransport::default();
        transport.respond_with(r#"{"id":1,"name":"John"}"#);
        let value = api_request(&transport, &config(), HttpMethod::Get, "/users/1", None)
            .await
            .unwrap();
        assert_eq!(value, json!({"id": 1, "name": "John"}));
        assert_eq!(transport.last().url, "https://api.example.com/users/1");
    }

    #[tokio::test]
    async fn transport_error_reaches_caller_unchanged() {
        let transport = RecordingTransport::default();
        let sent = TransportError::Connection("Network error".to_string());
        transport.fail_with(sent.clone());
        let err = post_handler(&transport, Some("/users"), Some(Body::Json(json!({}))), Some(&config()))
            .await
            .unwrap_err();
        match err {
            ApiError::Transport(received) => assert_eq!(received, sent),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_response_is_a_decode_error() {
        let transport = RecordingTransport::default();
        transport.respond_with("<html>oops</html>");
        let err = put_handler(&transport, Some("/users/1"), None, Some(&config()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_arguments_fail_before_any_transport_call() {
        let transport = RecordingTransport::default();
        let config = config();

        let err = get_handler(&transport, None, Some(&config)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = get_handler::<_, Config>(&transport, Some("/users"), None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = delete_handler(&transport, None, Some(&config)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = delete_handler::<_, Config>(&transport, Some("/users"), None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = put_handler::<_, Config>(&transport, Some("/users"), None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = post_handler(&transport, None, None, Some(&config)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));
        let err = patch_handler(&transport, None, None, Some(&config)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingArgument));

        assert!(transport.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn verb_helpers_pin_their_method() {
        let transport = RecordingTransport::default();
        let config = config();
        let body = || Some(Body::Json(json!({"a": 1})));

        get_handler(&transport, Some("/g"), Some(&config)).await.unwrap();
        put_handler(&transport, Some("/u"), body(), Some(&config)).await.unwrap();
        post_handler(&transport, Some("/p"), body(), Some(&config)).await.unwrap();
        patch_handler(&transport, Some("/a"), body(), Some(&config)).await.unwrap();
        delete_handler(&transport, Some("/d"), Some(&config)).await.unwrap();

        let sent: Vec<(HttpMethod, Option<String>)> = transport
            .requests
            .lock()
            .iter()
            .map(|r| (r.method, r.body.clone()))
            .collect();
        let json_body = Some(r#"{"a":1}"#.to_string());
        assert_eq!(
            sent,
            vec![
                (HttpMethod::Get, None),
                (HttpMethod::Put, json_body.clone()),
                (HttpMethod::Post, json_body.clone()),
                (HttpMethod::Patch, json_body),
                (HttpMethod::Delete, None),
            ]
        );
    }

    #[tokio::test]
    async fn dispatcher_accepts_any_config_reader() {
        struct Fixed;
        impl ConfigReader for Fixed {
            fn base_url(&self) -> Option<String> {
                Some("http://fixed".to_string())
            }
            fn headers(&self) -> Option<Headers> {
                None
            }
        }

        let transport = RecordingTransport::default();
        get_handler(&transport, Some("/x"), Some(&Fixed)).await.unwrap();
        let req = transport.last();
        assert_eq!(req.url, "http://fixed/x");
        assert!(req.headers.is_none());
    }
}
