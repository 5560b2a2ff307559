use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Conversion of Rust values into the textual operand of a filter.
///
/// Strings go through verbatim, numbers and booleans in their usual text
/// form, `None` as `null`.
pub trait FilterValue {
    fn to_filter_value(&self) -> String;
}

impl<T: FilterValue + ?Sized> FilterValue for &T {
    fn to_filter_value(&self) -> String {
        (**self).to_filter_value()
    }
}

impl FilterValue for str {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl FilterValue for String {
    fn to_filter_value(&self) -> String {
        self.clone()
    }
}

macro_rules! display_filter_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FilterValue for $t {
                fn to_filter_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_filter_value!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
    Uuid, NaiveDate, NaiveDateTime, NaiveTime,
);

impl FilterValue for chrono::DateTime<chrono::Utc> {
    fn to_filter_value(&self) -> String {
        self.to_rfc3339()
    }
}

impl<T: FilterValue> FilterValue for Option<T> {
    fn to_filter_value(&self) -> String {
        match self {
            Some(v) => v.to_filter_value(),
            None => "null".to_string(),
        }
    }
}

impl FilterValue for JsonValue {
    fn to_filter_value(&self) -> String {
        match self {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Operand of `contains`, `contained_by` and `overlaps`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainmentValue {
    /// Range or array literal passed through verbatim, e.g. `[1,5)`.
    Text(String),
    /// Array elements, rendered as `{a,b,c}`.
    Array(Vec<String>),
    /// JSON document for jsonb columns, rendered as compact JSON.
    Json(JsonValue),
}

impl ContainmentValue {
    pub(crate) fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Array(items) => format!("{{{}}}", items.join(",")),
            Self::Json(v) => v.to_string(),
        }
    }
}

impl From<&str> for ContainmentValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ContainmentValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: FilterValue> From<Vec<T>> for ContainmentValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.iter().map(FilterValue::to_filter_value).collect())
    }
}

impl<T: FilterValue> From<&[T]> for ContainmentValue {
    fn from(items: &[T]) -> Self {
        Self::Array(items.iter().map(FilterValue::to_filter_value).collect())
    }
}

impl<T: FilterValue, const N: usize> From<[T; N]> for ContainmentValue {
    fn from(items: [T; N]) -> Self {
        Self::Array(items.iter().map(FilterValue::to_filter_value).collect())
    }
}

impl From<JsonValue> for ContainmentValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::String(s) => Self::Text(s),
            JsonValue::Array(items) => {
                Self::Array(items.iter().map(FilterValue::to_filter_value).collect())
            }
            other => Self::Json(other),
        }
    }
}
