//! Chainable PostgREST client.
//!
//! Re-exports the core types (client, config, errors, envelope, transport)
//! and, with the default `query` feature, the query builder.

// Re-export core (always available)
pub use postgrest_client_core::*;

// Re-export query builder (feature-gated)
#[cfg(feature = "query")]
pub use postgrest_client_query::*;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use postgrest_client::prelude::*;
/// ```
pub mod prelude {
    pub use postgrest_client_core::{
        CancellationToken, PostgrestClient, PostgrestConfig, PostgrestError, PostgrestResponse,
        PostgrestResult,
    };

    #[cfg(feature = "query")]
    pub use postgrest_client_query::{
        CountOption, ExplainFormat, ExplainOptions, Filterable, InsertOptions, IsValue,
        Modifiable, OrderOptions, PostgrestClientQueryExt, RpcOptions, SelectOptions,
        TextSearchOptions, TextSearchType, UpsertOptions,
    };
}
