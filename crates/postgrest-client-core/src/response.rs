use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::PostgrestError;

/// Response type matching PostgREST's `{ data, error, count, status, statusText }` pattern.
///
/// Every request resolves into one of these unless the throw-on-error policy
/// turned the failure into an `Err`.
#[derive(Debug)]
pub struct PostgrestResponse {
    /// The returned data. `None` for empty bodies, HEAD requests and errors.
    pub data: Option<JsonValue>,
    /// Error, if any.
    pub error: Option<PostgrestError>,
    /// Row count (only when a count was requested and the server reported one).
    pub count: Option<i64>,
    /// HTTP status code, `0` when the request never reached the server.
    pub status: u16,
    /// HTTP status text, empty when the request never reached the server.
    pub status_text: String,
}

impl PostgrestResponse {
    /// Create a successful response.
    pub fn ok(data: Option<JsonValue>, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            data,
            error: None,
            count: None,
            status,
            status_text: status_text.into(),
        }
    }

    /// Create an error response.
    pub fn error(err: PostgrestError, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(err),
            count: None,
            status,
            status_text: status_text.into(),
        }
    }

    /// Check if the response is successful.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Check if the response has an error.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a Result, consuming the response.
    pub fn into_result(self) -> Result<Option<JsonValue>, PostgrestError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }

    /// Deserialize the data into a typed value.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, PostgrestError> {
        self.data
            .as_ref()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(PostgrestError::from)
    }

    /// Deserialize array data into typed rows. No data yields no rows.
    pub fn rows_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, PostgrestError> {
        Ok(self.data_as::<Vec<T>>()?.unwrap_or_default())
    }

    /// Set the count.
    pub fn with_count(mut self, count: Option<i64>) -> Self {
        self.count = count;
        self
    }
}
