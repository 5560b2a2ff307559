use std::sync::Arc;

use url::Url;

use crate::config::PostgrestConfig;
use crate::error::PostgrestResult;
use crate::transport::{ReqwestTransport, Transport};

/// The main client for talking to a PostgREST endpoint.
///
/// Holds the validated base URL, default headers and the transport used for
/// every request. Cheap to clone.
#[derive(Clone)]
pub struct PostgrestClient {
    config: Arc<PostgrestConfig>,
    rest_url: Url,
    transport: Arc<dyn Transport>,
}

impl PostgrestClient {
    /// Create a new client using the default reqwest transport.
    pub fn new(config: PostgrestConfig) -> PostgrestResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::default()))
    }

    /// Create a client with a caller-supplied transport.
    pub fn with_transport(
        config: PostgrestConfig,
        transport: Arc<dyn Transport>,
    ) -> PostgrestResult<Self> {
        let rest_url = Url::parse(config.url.trim_end_matches('/'))?;
        tracing::debug!(url = %rest_url, schema = ?config.schema, "Created PostgREST client");
        Ok(Self {
            config: Arc::new(config),
            rest_url,
            transport,
        })
    }

    /// Return a client bound to another schema, sharing the same transport.
    pub fn schema(&self, schema: impl Into<String>) -> Self {
        let config = PostgrestConfig {
            schema: Some(schema.into()),
            ..(*self.config).clone()
        };
        Self {
            config: Arc::new(config),
            rest_url: self.rest_url.clone(),
            transport: Arc::clone(&self.transport),
        }
    }

    /// Base URL of the REST API.
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Schema requests are bound to, if any.
    pub fn schema_name(&self) -> Option<&str> {
        self.config.schema.as_deref()
    }

    /// Get the full config.
    pub fn config(&self) -> &PostgrestConfig {
        &self.config
    }

    /// Get an Arc to the transport (for passing to builders).
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("rest_url", &self.rest_url.as_str())
            .field("schema", &self.config.schema)
            .finish()
    }
}
