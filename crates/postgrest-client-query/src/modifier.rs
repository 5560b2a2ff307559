use reqwest::header::{HeaderName, HeaderValue, ACCEPT};

use crate::builder::RequestState;
use crate::operator::{ExplainFormat, ExplainOptions, OrderOptions};
use crate::url::{get_param, merge_params};

pub(crate) const PREFER: &str = "Prefer";
pub(crate) const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
pub(crate) const CSV: &str = "text/csv";

/// Trait providing transform methods (order, limit, range, single, csv, explain...).
pub trait Modifiable: Sized {
    /// Get a mutable reference to the request state.
    fn state_mut(&mut self) -> &mut RequestState;

    /// Ask write requests to return the affected rows, restricted to `columns`.
    fn select_columns(mut self, columns: &str) -> Self {
        let cleaned = clean_columns(columns);
        let state = self.state_mut();
        state.url = merge_params(&state.url, [("select", cleaned)]);
        append_prefer(state, "return=representation");
        self
    }

    /// Order the result by `column`. Repeated calls add secondary orderings.
    fn order(mut self, column: &str, options: OrderOptions) -> Self {
        if column.trim().is_empty() {
            tracing::error!("Invalid column name in order: Column name cannot be empty");
            return self;
        }
        let key = match &options.foreign_table {
            Some(table) => format!("{table}.order"),
            None => "order".to_string(),
        };
        let direction = if options.ascending { "asc" } else { "desc" };
        let nulls = match options.nulls_first {
            Some(true) => ".nullsfirst",
            Some(false) => ".nullslast",
            None => "",
        };
        let term = format!("{column}.{direction}{nulls}");

        let state = self.state_mut();
        let value = match get_param(&state.url, &key) {
            Some(existing) => format!("{existing},{term}"),
            None => term,
        };
        state.url = merge_params(&state.url, [(key, value)]);
        self
    }

    /// Limit the number of rows returned.
    fn limit(mut self, count: u64) -> Self {
        let state = self.state_mut();
        state.url = merge_params(&state.url, [("limit", count.to_string())]);
        self
    }

    /// Limit the rows of an embedded (foreign) table.
    fn limit_foreign(mut self, foreign_table: &str, count: u64) -> Self {
        let state = self.state_mut();
        state.url = merge_params(
            &state.url,
            [(format!("{foreign_table}.limit"), count.to_string())],
        );
        self
    }

    /// Return rows `from..=to` (0-based, inclusive).
    fn range(mut self, from: u64, to: u64) -> Self {
        let state = self.state_mut();
        state.url = merge_params(
            &state.url,
            [
                ("offset".to_string(), from.to_string()),
                ("limit".to_string(), range_len(from, to).to_string()),
            ],
        );
        self
    }

    /// Range over the rows of an embedded (foreign) table.
    fn range_foreign(mut self, foreign_table: &str, from: u64, to: u64) -> Self {
        let state = self.state_mut();
        state.url = merge_params(
            &state.url,
            [
                (format!("{foreign_table}.offset"), from.to_string()),
                (format!("{foreign_table}.limit"), range_len(from, to).to_string()),
            ],
        );
        self
    }

    /// Expect exactly one row; the data becomes an object instead of an array.
    fn single(mut self) -> Self {
        set_header(self.state_mut(), ACCEPT, SINGLE_OBJECT);
        self
    }

    /// Expect zero or one row. Zero rows resolve as success with no data.
    fn maybe_single(mut self) -> Self {
        let state = self.state_mut();
        set_header(state, ACCEPT, SINGLE_OBJECT);
        state.allow_empty = true;
        self
    }

    /// Return the data as CSV text.
    fn csv(mut self) -> Self {
        set_header(self.state_mut(), ACCEPT, CSV);
        self
    }

    /// Return the execution plan instead of the rows.
    fn explain(mut self, options: ExplainOptions) -> Self {
        let state = self.state_mut();
        let for_media = state
            .headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let format = match options.format {
            ExplainFormat::Text => "text",
            ExplainFormat::Json => "json",
        };
        let mut accept = format!("application/vnd.pgrst.plan+{format}; for=\"{for_media}\"");
        if let Some(opts) = options.options() {
            accept.push_str(&format!("; options={opts};"));
        }
        set_header(state, ACCEPT, &accept);
        self
    }

    /// Run the request in a transaction that is rolled back afterwards.
    fn rollback(mut self) -> Self {
        append_prefer(self.state_mut(), "tx=rollback");
        self
    }
}

fn range_len(from: u64, to: u64) -> u64 {
    to.saturating_add(1).saturating_sub(from)
}

/// Strip whitespace from a column list, except inside double quotes.
pub(crate) fn clean_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|c| {
            if c.is_whitespace() && !quoted {
                return false;
            }
            if *c == '"' {
                quoted = !quoted;
            }
            true
        })
        .collect()
}

pub(crate) fn set_header(state: &mut RequestState, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            state.headers.insert(name, v);
        }
        Err(e) => tracing::error!("Invalid value for header {name}: {e}"),
    }
}

/// Add a directive to the `Prefer` header, keeping the existing ones.
pub(crate) fn append_prefer(state: &mut RequestState, directive: &str) {
    let current = state
        .headers
        .get(PREFER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let value = match current {
        Some(existing) if existing.split(',').any(|d| d.trim() == directive) => return,
        Some(existing) if !existing.is_empty() => format!("{existing},{directive}"),
        _ => directive.to_string(),
    };
    set_header(state, HeaderName::from_static("prefer"), &value);
}
