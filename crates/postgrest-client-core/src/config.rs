use std::collections::HashMap;

use crate::error::{PostgrestError, PostgrestResult};

/// Configuration for talking to a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Base URL of the REST API (e.g. "http://localhost:3000" or
    /// "https://project.supabase.co/rest/v1")
    pub url: String,
    /// Schema to target; rendered into Accept-Profile / Content-Profile
    pub schema: Option<String>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
}

impl PostgrestConfig {
    /// Create a new config for the given REST base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            schema: None,
            headers: HashMap::new(),
        }
    }

    /// Build a config from `POSTGREST_URL`, `POSTGREST_SCHEMA` and `POSTGREST_API_KEY`.
    pub fn from_env() -> PostgrestResult<Self> {
        let url = std::env::var("POSTGREST_URL")
            .map_err(|_| PostgrestError::config("POSTGREST_URL is not set"))?;
        let mut config = Self::new(url);
        if let Ok(schema) = std::env::var("POSTGREST_SCHEMA") {
            config = config.schema(schema);
        }
        if let Ok(key) = std::env::var("POSTGREST_API_KEY") {
            config = config.api_key(key);
        }
        Ok(config)
    }

    /// Set the schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Send `apikey` and `Authorization: Bearer` headers with every request.
    pub fn api_key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.header("apikey", key.clone())
            .header("Authorization", format!("Bearer {key}"))
    }
}
