pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod transport;

pub use client::PostgrestClient;
pub use config::PostgrestConfig;
pub use error::{ErrorShape, PostgrestError, PostgrestResult, TransportError};
pub use response::PostgrestResponse;
pub use transport::{Method, RawResponse, ReqwestTransport, Transport, TransportRequest};

pub use tokio_util::sync::CancellationToken;
