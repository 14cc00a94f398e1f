use crate::{Config, NormalizedOutput, backend::caiyun::CaiyunBackend};
use async_trait::async_trait;
use std::{collections::HashMap, fmt::Debug};
use thiserror::Error;
use tracing::warn;

pub mod caiyun;

/// Errors raised while fetching and decoding one provider response. Each
/// variant embeds the request URL (or raw body) so a failing provider can be
/// diagnosed from the log alone.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("backend is not configured: call setup() before fetch()")]
    NotConfigured,

    #[error("unable to get ({url}): {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to get ({url}): http status {code}")]
    HttpStatus { url: String, code: u16 },

    #[error("unable to read response body ({url}): {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to decode response ({url}): {source}; the json body is: {body}")]
    Decode {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A pluggable adapter for one upstream weather-data provider.
///
/// Lifecycle: `setup` binds credentials and coordinates exactly once (it is
/// idempotent for the same config source), after which `fetch` is stateless
/// across calls — every call re-queries upstream. Calling `fetch` before
/// `setup` fails fast with [`FetchError::NotConfigured`].
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Human-readable provider name, also the registry key.
    fn name(&self) -> &'static str;

    /// Bind the API token and coordinates from the configuration source.
    fn setup(&mut self, config: &Config) -> anyhow::Result<()>;

    /// Fetch and normalize one provider response.
    ///
    /// Failures are logged and returned, so the aggregation layer can tell
    /// "provider failing" apart from "nothing to report". `location` and
    /// `numdays` do not currently vary the request; the coordinates bound by
    /// `setup` are used instead.
    async fn fetch(&self, location: &str, numdays: u32) -> Result<NormalizedOutput, FetchError>;

    /// Degrading variant for callers that must never fail: logs the error and
    /// returns the zero-value [`NormalizedOutput`].
    async fn fetch_or_empty(&self, location: &str, numdays: u32) -> NormalizedOutput {
        match self.fetch(location, numdays).await {
            Ok(data) => data,
            Err(err) => {
                warn!(backend = self.name(), error = %err, "fetch failed, returning empty data");
                NormalizedOutput::default()
            }
        }
    }
}

/// Mapping from provider name to backend instance.
///
/// Constructed once in the composition root and passed by reference to
/// whatever needs backend lookup; entries are inserted at startup and never
/// removed. Registering a second backend under an existing name replaces the
/// first (last write wins).
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Box<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All known backends, each built from its factory.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(caiyun::BACKEND_NAME, Box::new(CaiyunBackend::new()));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, backend: Box<dyn Backend>) {
        self.backends.insert(name.into(), backend);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Backend> {
        self.backends.get(name).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Backend>> {
        self.backends.get_mut(name)
    }

    /// Registered backend names, sorted for stable listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run `setup` on every registered backend against the same config.
    pub fn setup_all(&mut self, config: &Config) -> anyhow::Result<()> {
        for backend in self.backends.values_mut() {
            backend.setup(config)?;
        }
        Ok(())
    }
}
