pub mod client;
pub mod query;
pub mod request;
pub mod types;

pub use client::GraphqlClient;
pub use query::QueryTemplate;
pub use request::RequestBuilder;
pub use types::{GraphqlError, GraphqlRequest, GraphqlResponse};
