use url::Url;

use crate::operator::{IsValue, TextSearchOptions};
use crate::url::merge_params;
use crate::value::{ContainmentValue, FilterValue};

/// Trait providing all filter methods for query builders.
///
/// Each call renders one `column=operator.operand` pair and merges it into
/// the request URL. Implementors only provide access to that URL.
pub trait Filterable: Sized {
    /// Get a mutable reference to the request URL.
    fn url_mut(&mut self) -> &mut Url;

    /// Merge one encoded pair into the URL.
    fn push_param(mut self, key: &str, value: String) -> Self {
        let merged = merge_params(self.url_mut(), [(key, value)]);
        *self.url_mut() = merged;
        self
    }

    /// Filter: column = value
    fn eq(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in eq filter: {e}");
            return self;
        }
        self.push_param(column, format!("eq.{}", value.to_filter_value()))
    }

    /// Filter: column != value
    fn neq(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in neq filter: {e}");
            return self;
        }
        self.push_param(column, format!("neq.{}", value.to_filter_value()))
    }

    /// Filter: column > value
    fn gt(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in gt filter: {e}");
            return self;
        }
        self.push_param(column, format!("gt.{}", value.to_filter_value()))
    }

    /// Filter: column >= value
    fn gte(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in gte filter: {e}");
            return self;
        }
        self.push_param(column, format!("gte.{}", value.to_filter_value()))
    }

    /// Filter: column < value
    fn lt(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in lt filter: {e}");
            return self;
        }
        self.push_param(column, format!("lt.{}", value.to_filter_value()))
    }

    /// Filter: column <= value
    fn lte(self, column: &str, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in lte filter: {e}");
            return self;
        }
        self.push_param(column, format!("lte.{}", value.to_filter_value()))
    }

    /// Filter: column LIKE pattern (`*` may stand in for `%`)
    fn like(self, column: &str, pattern: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in like filter: {e}");
            return self;
        }
        self.push_param(column, format!("like.{pattern}"))
    }

    /// Filter: column matches all of the patterns
    fn like_all_of(self, column: &str, patterns: &[&str]) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in like_all_of filter: {e}");
            return self;
        }
        self.push_param(column, format!("like(all).{{{}}}", patterns.join(",")))
    }

    /// Filter: column matches any of the patterns
    fn like_any_of(self, column: &str, patterns: &[&str]) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in like_any_of filter: {e}");
            return self;
        }
        self.push_param(column, format!("like(any).{{{}}}", patterns.join(",")))
    }

    /// Filter: column ILIKE pattern (case-insensitive)
    fn ilike(self, column: &str, pattern: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in ilike filter: {e}");
            return self;
        }
        self.push_param(column, format!("ilike.{pattern}"))
    }

    /// Filter: column matches all of the patterns, case-insensitively
    fn ilike_all_of(self, column: &str, patterns: &[&str]) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in ilike_all_of filter: {e}");
            return self;
        }
        self.push_param(column, format!("ilike(all).{{{}}}", patterns.join(",")))
    }

    /// Filter: column matches any of the patterns, case-insensitively
    fn ilike_any_of(self, column: &str, patterns: &[&str]) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in ilike_any_of filter: {e}");
            return self;
        }
        self.push_param(column, format!("ilike(any).{{{}}}", patterns.join(",")))
    }

    /// Filter: column IS NULL / TRUE / FALSE / UNKNOWN
    fn is(self, column: &str, value: impl Into<IsValue>) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in is filter: {e}");
            return self;
        }
        self.push_param(column, format!("is.{}", value.into().as_str()))
    }

    /// Filter: column IN (val1, val2, ...)
    ///
    /// Values containing `,`, `(` or `)` are double-quoted.
    fn in_<V: FilterValue>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in in_ filter: {e}");
            return self;
        }
        let cleaned = values
            .into_iter()
            .map(|v| {
                let s = v.to_filter_value();
                if s.contains(&[',', '(', ')'][..]) {
                    format!("\"{s}\"")
                } else {
                    s
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        self.push_param(column, format!("in.({cleaned})"))
    }

    /// Filter: column @> value (contains)
    fn contains(self, column: &str, value: impl Into<ContainmentValue>) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in contains filter: {e}");
            return self;
        }
        self.push_param(column, format!("cs.{}", value.into().render()))
    }

    /// Filter: column <@ value (contained by)
    fn contained_by(self, column: &str, value: impl Into<ContainmentValue>) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in contained_by filter: {e}");
            return self;
        }
        self.push_param(column, format!("cd.{}", value.into().render()))
    }

    /// Filter: range column is strictly right of `range`
    fn range_gt(self, column: &str, range: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in range_gt filter: {e}");
            return self;
        }
        self.push_param(column, format!("sr.{range}"))
    }

    /// Filter: range column does not extend left of `range`
    fn range_gte(self, column: &str, range: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in range_gte filter: {e}");
            return self;
        }
        self.push_param(column, format!("nxl.{range}"))
    }

    /// Filter: range column is strictly left of `range`
    fn range_lt(self, column: &str, range: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in range_lt filter: {e}");
            return self;
        }
        self.push_param(column, format!("sl.{range}"))
    }

    /// Filter: range column does not extend right of `range`
    fn range_lte(self, column: &str, range: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in range_lte filter: {e}");
            return self;
        }
        self.push_param(column, format!("nxr.{range}"))
    }

    /// Filter: range column is adjacent to `range`
    fn range_adjacent(self, column: &str, range: &str) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in range_adjacent filter: {e}");
            return self;
        }
        self.push_param(column, format!("adj.{range}"))
    }

    /// Filter: column && value (overlaps)
    fn overlaps(self, column: &str, value: impl Into<ContainmentValue>) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in overlaps filter: {e}");
            return self;
        }
        self.push_param(column, format!("ov.{}", value.into().render()))
    }

    /// Full-text search filter.
    fn text_search(self, column: &str, query: &str, options: TextSearchOptions) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in text_search filter: {e}");
            return self;
        }
        let type_part = options.search_type.map(|t| t.prefix()).unwrap_or("");
        let config_part = options
            .config
            .map(|c| format!("({c})"))
            .unwrap_or_default();
        self.push_param(column, format!("{type_part}fts{config_part}.{query}"))
    }

    /// Match multiple column=value pairs (all must match), in the given order.
    fn match_filter<V: FilterValue>(
        mut self,
        pairs: impl IntoIterator<Item = (impl AsRef<str>, V)>,
    ) -> Self {
        for (column, value) in pairs {
            self = self.eq(column.as_ref(), value);
        }
        self
    }

    /// Negate a filter: `column=not.operator.value`.
    ///
    /// Operator and value are sent as-is.
    fn not(self, column: &str, operator: impl AsRef<str>, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in not filter: {e}");
            return self;
        }
        self.push_param(
            column,
            format!("not.{}.{}", operator.as_ref(), value.to_filter_value()),
        )
    }

    /// OR filter in raw PostgREST syntax, e.g. `"id.eq.1,name.eq.Tokyo"`.
    ///
    /// The filter string is sent as-is inside the parentheses.
    fn or(self, filters: &str) -> Self {
        self.push_param("or", format!("({filters})"))
    }

    /// OR filter applied to an embedded (foreign) table.
    fn or_foreign(self, foreign_table: &str, filters: &str) -> Self {
        self.push_param(&format!("{foreign_table}.or"), format!("({filters})"))
    }

    /// Raw filter escape hatch: `column=operator.value`, unescaped.
    fn filter(self, column: &str, operator: impl AsRef<str>, value: impl FilterValue) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in filter: {e}");
            return self;
        }
        self.push_param(
            column,
            format!("{}.{}", operator.as_ref(), value.to_filter_value()),
        )
    }
}

/// Reject column names PostgREST can never accept.
pub fn validate_column_name(name: &str) -> Result<(), postgrest_client_core::PostgrestError> {
    if name.trim().is_empty() {
        return Err(postgrest_client_core::PostgrestError::config(
            "Column name cannot be empty",
        ));
    }
    Ok(())
}
