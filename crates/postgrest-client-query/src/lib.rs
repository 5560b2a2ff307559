//! Query building and response normalization for PostgREST.
//!
//! ```ignore
//! use postgrest_client_query::{Filterable, Modifiable, OrderOptions, PostgrestClientQueryExt};
//!
//! let resp = client
//!     .from("cities")
//!     .select("name, country_id")
//!     .eq("country_id", 1)
//!     .order("name", OrderOptions::asc())
//!     .limit(10)
//!     .await?;
//! ```

pub mod builder;
pub mod execute;
pub mod filter;
pub mod modifier;
pub mod operator;
pub mod rpc;
pub mod table;
pub mod url;
pub mod value;

pub use builder::{PostgrestBuilder, RequestState};
pub use filter::{validate_column_name, Filterable};
pub use modifier::Modifiable;
pub use operator::{
    CountOption, ExplainFormat, ExplainOptions, FilterOperator, IsValue, OrderOptions,
    TextSearchOptions, TextSearchType,
};
pub use rpc::RpcOptions;
pub use table::{
    InsertOptions, PostgrestClientQueryExt, QueryBuilder, SelectOptions, UpsertOptions,
};
pub use crate::url::{get_param, merge_params};
pub use value::{ContainmentValue, FilterValue};
