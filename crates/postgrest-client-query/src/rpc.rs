use serde_json::Value as JsonValue;

use postgrest_client_core::{Method, PostgrestClient, PostgrestError, PostgrestResult};

use crate::builder::PostgrestBuilder;
use crate::operator::CountOption;
use crate::table::{endpoint, with_count};
use crate::url::merge_params;
use crate::value::FilterValue;

/// Options for calling a database function.
#[derive(Debug, Clone, Default)]
pub struct RpcOptions {
    /// Send a HEAD request with the arguments in the query string.
    pub head: bool,
    /// Send a GET request with the arguments in the query string
    /// (read-only functions only).
    pub get: bool,
    pub count: Option<CountOption>,
}

impl RpcOptions {
    pub fn head() -> Self {
        Self {
            head: true,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self {
            get: true,
            ..Default::default()
        }
    }

    pub fn count(mut self, count: CountOption) -> Self {
        self.count = Some(count);
        self
    }
}

/// Build a call to `/rpc/{function}`.
///
/// `args` must be a JSON object (named arguments) or null. POST calls send it
/// as the body; GET and HEAD calls encode each argument as a query param,
/// with arrays rendered as `{a,b}`.
pub(crate) fn build_rpc(
    client: &PostgrestClient,
    function: &str,
    args: JsonValue,
    options: RpcOptions,
) -> PostgrestResult<PostgrestBuilder> {
    if function.trim().is_empty() {
        return Err(PostgrestError::config("Function name cannot be empty"));
    }
    let args = match args {
        JsonValue::Object(map) => map,
        JsonValue::Null => serde_json::Map::new(),
        _ => {
            return Err(PostgrestError::config(
                "RPC arguments must be a JSON object or null",
            ))
        }
    };

    let method = if options.head {
        Method::Head
    } else if options.get {
        Method::Get
    } else {
        Method::Post
    };
    let url = endpoint(client.rest_url(), &["rpc", function]);

    let mut builder = PostgrestBuilder::new(client.transport(), method, url)
        .headers(&client.config().headers);
    if let Some(schema) = client.schema_name() {
        builder = builder.schema(schema);
    }

    if method.is_read() {
        let params: Vec<(String, String)> = args
            .iter()
            .map(|(name, value)| (name.clone(), rpc_param(value)))
            .collect();
        builder.state.url = merge_params(&builder.state.url, params);
    } else {
        builder = builder.body(JsonValue::Object(args));
    }

    tracing::debug!(function, method = %method, "Built RPC request");
    Ok(with_count(builder, options.count))
}

fn rpc_param(value: &JsonValue) -> String {
    match value {
        JsonValue::Array(items) => format!(
            "{{{}}}",
            items
                .iter()
                .map(FilterValue::to_filter_value)
                .collect::<Vec<_>>()
                .join(",")
        ),
        other => other.to_filter_value(),
    }
}
