use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value as JsonValue;
use url::Url;

use postgrest_client_core::{
    CancellationToken, Method, PostgrestResponse, PostgrestResult, Transport,
};

use crate::execute;
use crate::filter::Filterable;
use crate::modifier::Modifiable;

/// Everything one request owns while it is being configured.
#[derive(Debug, Clone)]
pub struct RequestState {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) schema: Option<String>,
    pub(crate) body: Option<JsonValue>,
    pub(crate) throw_on_error: bool,
    pub(crate) allow_empty: bool,
    pub(crate) signal: Option<CancellationToken>,
}

impl RequestState {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            schema: None,
            body: None,
            throw_on_error: false,
            allow_empty: false,
            signal: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }
}

/// A configured PostgREST request, resolved by `.await` or [`execute`](Self::execute).
///
/// Filters and transforms mutate the state while the builder is owned by the
/// caller. Resolving consumes the builder: exactly one transport call is made
/// and nothing can touch the state afterwards.
pub struct PostgrestBuilder {
    pub(crate) state: RequestState,
    pub(crate) transport: Arc<dyn Transport>,
}

impl Filterable for PostgrestBuilder {
    fn url_mut(&mut self) -> &mut Url {
        &mut self.state.url
    }
}

impl Modifiable for PostgrestBuilder {
    fn state_mut(&mut self) -> &mut RequestState {
        &mut self.state
    }
}

impl PostgrestBuilder {
    pub fn new(transport: Arc<dyn Transport>, method: Method, url: Url) -> Self {
        Self {
            state: RequestState::new(method, url),
            transport,
        }
    }

    /// Reject with the error instead of returning it inside the response.
    pub fn throw_on_error(mut self) -> Self {
        self.state.throw_on_error = true;
        self
    }

    /// Forward a cancellation token to the transport.
    pub fn abort_signal(mut self, signal: CancellationToken) -> Self {
        self.state.signal = Some(signal);
        self
    }

    /// Target another schema (Accept-Profile / Content-Profile).
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.state.schema = Some(schema.into());
        self
    }

    /// Set a request header. Invalid names or values are logged and skipped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.state.headers.insert(name, value);
            }
            _ => tracing::error!("Invalid header {name}: {value:?}"),
        }
        self
    }

    /// Add headers from a string map (client defaults).
    pub(crate) fn headers<'a>(
        mut self,
        headers: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    /// Set the JSON body.
    pub(crate) fn body(mut self, body: JsonValue) -> Self {
        self.state.body = Some(body);
        self
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn url(&self) -> &Url {
        &self.state.url
    }

    /// Send the request and normalize the response.
    ///
    /// With the default policy this always returns `Ok`; failures live in
    /// [`PostgrestResponse::error`]. After [`throw_on_error`](Self::throw_on_error)
    /// server and transport errors come back as `Err`.
    pub async fn execute(self) -> PostgrestResult<PostgrestResponse> {
        execute::execute(self.state, self.transport.as_ref()).await
    }
}

impl IntoFuture for PostgrestBuilder {
    type Output = PostgrestResult<PostgrestResponse>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

impl std::fmt::Debug for PostgrestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestBuilder")
            .field("state", &self.state)
            .finish()
    }
}
