use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use postgrest_client_core::{Method, PostgrestClient, PostgrestResult, Transport};

use crate::builder::PostgrestBuilder;
use crate::modifier::{append_prefer, clean_columns};
use crate::operator::CountOption;
use crate::url::merge_params;

/// Options for [`QueryBuilder::select_with`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Send a HEAD request: only the count and status come back.
    pub head: bool,
    pub count: Option<CountOption>,
}

/// Options for [`QueryBuilder::insert`].
#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub count: Option<CountOption>,
    /// When false, columns missing from a row take their database default
    /// (`Prefer: missing=default`) instead of null.
    pub default_to_null: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            count: None,
            default_to_null: true,
        }
    }
}

/// Options for [`QueryBuilder::upsert`].
#[derive(Debug, Clone)]
pub struct UpsertOptions {
    /// Comma-separated unique columns used to detect conflicts.
    pub on_conflict: Option<String>,
    /// Skip conflicting rows instead of merging them.
    pub ignore_duplicates: bool,
    pub count: Option<CountOption>,
    pub default_to_null: bool,
}

impl Default for UpsertOptions {
    fn default() -> Self {
        Self {
            on_conflict: None,
            ignore_duplicates: false,
            count: None,
            default_to_null: true,
        }
    }
}

impl UpsertOptions {
    pub fn on_conflict(mut self, columns: impl Into<String>) -> Self {
        self.on_conflict = Some(columns.into());
        self
    }

    pub fn ignore_duplicates(mut self) -> Self {
        self.ignore_duplicates = true;
        self
    }
}

/// Entry point for one table or view. Each operation yields a [`PostgrestBuilder`].
#[derive(Clone)]
pub struct QueryBuilder {
    url: Url,
    headers: HashMap<String, String>,
    schema: Option<String>,
    transport: Arc<dyn Transport>,
}

impl QueryBuilder {
    pub fn new(client: &PostgrestClient, table: &str) -> Self {
        Self {
            url: endpoint(client.rest_url(), &[table]),
            headers: client.config().headers.clone(),
            schema: client.schema_name().map(str::to_string),
            transport: client.transport(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn builder(&self, method: Method) -> PostgrestBuilder {
        let builder = PostgrestBuilder::new(Arc::clone(&self.transport), method, self.url.clone())
            .headers(&self.headers);
        match &self.schema {
            Some(schema) => builder.schema(schema.clone()),
            None => builder,
        }
    }

    /// Read rows, restricted to `columns` ("*" for all).
    pub fn select(&self, columns: &str) -> PostgrestBuilder {
        self.select_with(columns, SelectOptions::default())
    }

    /// Read rows with a count and/or as a HEAD request.
    pub fn select_with(&self, columns: &str, options: SelectOptions) -> PostgrestBuilder {
        let method = if options.head { Method::Head } else { Method::Get };
        let mut builder = self.builder(method);
        builder.state.url = merge_params(&builder.state.url, [("select", clean_columns(columns))]);
        with_count(builder, options.count)
    }

    /// Insert one row (a JSON object) or many (a JSON array of objects).
    pub fn insert<T: Serialize>(
        &self,
        values: &T,
        options: InsertOptions,
    ) -> PostgrestResult<PostgrestBuilder> {
        let body = serde_json::to_value(values)?;
        let mut builder = self.builder(Method::Post);
        if let Some(columns) = array_columns(&body) {
            builder.state.url = merge_params(&builder.state.url, [("columns", columns)]);
        }
        if !options.default_to_null {
            append_prefer(&mut builder.state, "missing=default");
        }
        Ok(with_count(builder.body(body), options.count))
    }

    /// Insert, or resolve conflicts on the primary key / `on_conflict` columns.
    pub fn upsert<T: Serialize>(
        &self,
        values: &T,
        options: UpsertOptions,
    ) -> PostgrestResult<PostgrestBuilder> {
        let body = serde_json::to_value(values)?;
        let mut builder = self.builder(Method::Post);
        let resolution = if options.ignore_duplicates {
            "resolution=ignore-duplicates"
        } else {
            "resolution=merge-duplicates"
        };
        append_prefer(&mut builder.state, resolution);
        if let Some(on_conflict) = &options.on_conflict {
            builder.state.url = merge_params(
                &builder.state.url,
                [("on_conflict", clean_columns(on_conflict))],
            );
        }
        if let Some(columns) = array_columns(&body) {
            builder.state.url = merge_params(&builder.state.url, [("columns", columns)]);
        }
        if !options.default_to_null {
            append_prefer(&mut builder.state, "missing=default");
        }
        Ok(with_count(builder.body(body), options.count))
    }

    /// Update the rows matched by the filters chained afterwards.
    pub fn update<T: Serialize>(
        &self,
        values: &T,
        count: Option<CountOption>,
    ) -> PostgrestResult<PostgrestBuilder> {
        let body = serde_json::to_value(values)?;
        Ok(with_count(self.builder(Method::Patch).body(body), count))
    }

    /// Delete the rows matched by the filters chained afterwards.
    pub fn delete(&self, count: Option<CountOption>) -> PostgrestBuilder {
        with_count(self.builder(Method::Delete), count)
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("url", &self.url.as_str())
            .field("schema", &self.schema)
            .finish()
    }
}

pub(crate) fn with_count(mut builder: PostgrestBuilder, count: Option<CountOption>) -> PostgrestBuilder {
    if let Some(count) = count {
        append_prefer(&mut builder.state, count.prefer());
    }
    builder
}

/// Append path segments to the REST base URL.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    match url.path_segments_mut() {
        Ok(mut path) => {
            path.pop_if_empty().extend(segments);
        }
        Err(()) => tracing::error!("REST URL {base} cannot carry a path"),
    }
    url
}

/// `"a","b"` from the union of keys of an array of objects, in first-seen order.
/// None when the body is not an array or no row has a key.
fn array_columns(body: &JsonValue) -> Option<String> {
    let rows = body.as_array()?;
    let mut columns: Vec<&str> = Vec::new();
    for key in rows.iter().filter_map(JsonValue::as_object).flat_map(|row| row.keys()) {
        if !columns.contains(&key.as_str()) {
            columns.push(key);
        }
    }
    if columns.is_empty() {
        return None;
    }
    Some(
        columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Extension trait adding query builder methods to [`PostgrestClient`].
pub trait PostgrestClientQueryExt {
    /// Start a query on a table or view.
    fn from(&self, table: &str) -> QueryBuilder;

    /// Call a database function.
    fn rpc(
        &self,
        function: &str,
        args: JsonValue,
        options: crate::rpc::RpcOptions,
    ) -> PostgrestResult<PostgrestBuilder>;
}

impl PostgrestClientQueryExt for PostgrestClient {
    fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self, table)
    }

    fn rpc(
        &self,
        function: &str,
        args: JsonValue,
        options: crate::rpc::RpcOptions,
    ) -> PostgrestResult<PostgrestBuilder> {
        crate::rpc::build_rpc(self, function, args, options)
    }
}
