//! `ApiManager`: verb methods bound to one owned configuration.
//!
//! # Design
//! The manager owns exactly one `Config` and one transport. Each verb reads
//! the configuration when it is called and forwards to the matching
//! dispatcher helper, returning its outcome untouched. Mutating the
//! configuration needs `&mut self`, so it cannot overlap a request issued
//! through the same manager; header maps shared through [`Headers`] handles
//! are the one way to change what an in-flight caller will see next.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::dispatch::{self, Body};
use crate::error::Result;
use crate::headers::Headers;
use crate::transport::Transport;

/// Construction options for [`ApiManager`].
#[derive(Debug, Clone, Default)]
pub struct ApiOptions {
    pub base_url: Option<String>,
    pub headers: Option<Headers>,
}

impl ApiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Facade over the dispatcher.
///
/// Cloning a manager shares its transport and its header map; see
/// [`Config`] for what a clone does and does not share.
///
/// ```no_run
/// use apiman_core::{ApiManager, ApiOptions, Headers};
///
/// # async fn example() -> apiman_core::Result<()> {
/// let headers: Headers = [("Authorization", "Bearer token")].into_iter().collect();
/// let api = ApiManager::new(
///     ApiOptions::new()
///         .base_url("https://api.example.com")
///         .headers(headers),
/// );
///
/// let users = api.get("/users").await?;
/// println!("{users}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiManager {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiManager {
    /// Manager backed by [`UreqTransport`](crate::transport::UreqTransport).
    ///
    /// Requests must be awaited inside a Tokio runtime: the transport runs
    /// each blocking call on `tokio::task::spawn_blocking`, which panics
    /// without one.
    #[cfg(feature = "ureq")]
    pub fn new(options: ApiOptions) -> Self {
        Self::with_transport(options, crate::transport::UreqTransport::new())
    }

    pub fn with_transport(options: ApiOptions, transport: impl Transport + 'static) -> Self {
        Self {
            config: Config::new(options.base_url, options.headers),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn update_headers(&mut self, headers: Option<Headers>) {
        self.config.set_headers(headers);
    }

    pub fn update_base_url(&mut self, url: Option<String>) {
        self.config.set_base_url(url);
    }

    pub fn instance(&self) -> &Self {
        self
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        dispatch::get_handler(self.transport.as_ref(), Some(endpoint), Some(&self.config)).await
    }

    pub async fn put(&self, endpoint: &str, data: Option<Body>) -> Result<Value> {
        dispatch::put_handler(self.transport.as_ref(), Some(endpoint), data, Some(&self.config)).await
    }

    pub async fn patch(&self, endpoint: &str, data: Option<Body>) -> Result<Value> {
        dispatch::patch_handler(self.transport.as_ref(), Some(endpoint), data, Some(&self.config)).await
    }

    pub async fn post(&self, endpoint: &str, data: Option<Body>) -> Result<Value> {
        dispatch::post_handler(self.transport.as_ref(), Some(endpoint), data, Some(&self.config)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        dispatch::delete_handler(self.transport.as_ref(), Some(endpoint), Some(&self.config)).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, endpoint: &str, data: &B) -> Result<Value> {
        self.put(endpoint, Some(Body::json(data)?)).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(&self, endpoint: &str, data: &B) -> Result<Value> {
        self.patch(endpoint, Some(Body::json(data)?)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, data: &B) -> Result<Value> {
        self.post(endpoint, Some(Body::json(data)?)).await
    }
}
