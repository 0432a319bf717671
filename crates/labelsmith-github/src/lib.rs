use std::sync::Arc;

use labelsmith_config::config::{Backend, Config};
use labelsmith_core::LabelApi;

pub mod error;
pub mod graphql;
pub mod http_client;
pub mod rest;
pub mod search;

pub use graphql::GraphqlApi;
pub use http_client::{ClientConfig, GithubClient};
pub use rest::RestApi;
pub use search::SearchKind;

/// Builds the backend selected by `config`.
pub fn create_api(config: &Config) -> Arc<dyn LabelApi> {
    let client = GithubClient::new(ClientConfig::from_config(config));
    match config.backend() {
        Backend::Rest => Arc::new(RestApi::new(client)),
        Backend::Graphql => Arc::new(GraphqlApi::new(client)),
    }
}
