use std::time::Duration;

use labelsmith_config::config::{Config, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL, DEFAULT_USER_AGENT};
use labelsmith_core::{ApiError, ApiResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::trace;
use ureq::{
    http::{header::AUTHORIZATION, Response},
    Agent, Body, RequestBuilder,
};

use crate::error::{classify_graphql, classify_status, transport_error, GraphqlError};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
    pub token: Option<String>,
    pub api_url: String,
    pub graphql_url: String,
}

impl Default for ClientConfig {
    /// Creates a ClientConfig pointing at github.com with a "labelsmith"
    /// user agent, no token and no timeout.
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.into()),
            timeout: None,
            token: None,
            api_url: DEFAULT_API_URL.into(),
            graphql_url: DEFAULT_GRAPHQL_URL.into(),
        }
    }
}

impl ClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: Some(config.user_agent().to_string()),
            timeout: config.timeout(),
            token: config.token().map(String::from),
            api_url: config.api_url().trim_end_matches('/').to_string(),
            graphql_url: config.graphql_url().to_string(),
        }
    }

    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    ///
    /// Status codes are not turned into transport errors so that error
    /// bodies can be classified.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// Authenticated client shared by the REST and GraphQL backends.
pub struct GithubClient {
    agent: Agent,
    config: ClientConfig,
}

impl GithubClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: config.build(),
            config,
        }
    }

    /// Absolute REST URL for `path` (which must start with `/`).
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    fn authorize<B>(&self, mut req: RequestBuilder<B>) -> RequestBuilder<B> {
        req = req
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.config.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        req
    }

    /// Turns a non-success response into an [`ApiError`].
    fn check(mut resp: Response<Body>, resource: &str) -> ApiResult<Response<Body>> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let remaining = resp
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = resp.body_mut().read_to_string().unwrap_or_default();

        Err(classify_status(
            status.as_u16(),
            &body,
            remaining.as_deref(),
            resource,
        ))
    }

    fn read_json<T: DeserializeOwned>(mut resp: Response<Body>) -> ApiResult<T> {
        resp.body_mut().read_json::<T>().map_err(transport_error)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str, resource: &str) -> ApiResult<T> {
        trace!(url, "GET");
        let resp = self
            .authorize(self.agent.get(url))
            .call()
            .map_err(transport_error)?;
        Self::read_json(Self::check(resp, resource)?)
    }

    pub fn post_json(&self, url: &str, body: &Value, resource: &str) -> ApiResult<()> {
        trace!(url, "POST");
        let resp = self
            .authorize(self.agent.post(url))
            .send_json(body)
            .map_err(transport_error)?;
        Self::check(resp, resource).map(|_| ())
    }

    pub fn patch_json(&self, url: &str, body: &Value, resource: &str) -> ApiResult<()> {
        trace!(url, "PATCH");
        let resp = self
            .authorize(self.agent.patch(url))
            .send_json(body)
            .map_err(transport_error)?;
        Self::check(resp, resource).map(|_| ())
    }

    pub fn delete(&self, url: &str, resource: &str) -> ApiResult<()> {
        trace!(url, "DELETE");
        let resp = self
            .authorize(self.agent.delete(url))
            .call()
            .map_err(transport_error)?;
        Self::check(resp, resource).map(|_| ())
    }

    /// Runs a GraphQL document and returns its `data`.
    pub fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        resource: &str,
    ) -> ApiResult<T> {
        trace!(url = self.config.graphql_url, "GraphQL");
        let request = GraphqlRequest {
            query,
            variables,
        };
        let resp = self
            .authorize(self.agent.post(&self.config.graphql_url))
            .send_json(&request)
            .map_err(transport_error)?;
        let response: GraphqlResponse<T> = Self::read_json(Self::check(resp, resource)?)?;
        unwrap_graphql(response, resource)
    }

    pub fn add_labels_to_labelable(&self, item_id: &str, label_ids: &[String]) -> ApiResult<()> {
        let _: Value = self.graphql(
            ADD_LABELS_MUTATION,
            json!({ "input": { "labelableId": item_id, "labelIds": label_ids } }),
            &format!("item '{item_id}'"),
        )?;
        Ok(())
    }

    pub fn remove_labels_from_labelable(
        &self,
        item_id: &str,
        label_ids: &[String],
    ) -> ApiResult<()> {
        let _: Value = self.graphql(
            REMOVE_LABELS_MUTATION,
            json!({ "input": { "labelableId": item_id, "labelIds": label_ids } }),
            &format!("item '{item_id}'"),
        )?;
        Ok(())
    }
}

fn unwrap_graphql<T>(response: GraphqlResponse<T>, resource: &str) -> ApiResult<T> {
    if !response.errors.is_empty() {
        return Err(classify_graphql(&response.errors, resource));
    }
    response
        .data
        .ok_or_else(|| ApiError::Unclassified("GraphQL response has no data".to_string()))
}

const ADD_LABELS_MUTATION: &str = "mutation($input: AddLabelsToLabelableInput!) {
  addLabelsToLabelable(input: $input) { clientMutationId }
}";

const REMOVE_LABELS_MUTATION: &str = "mutation($input: RemoveLabelsFromLabelableInput!) {
  removeLabelsFromLabelable(input: $input) { clientMutationId }
}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.user_agent.as_deref(), Some("labelsmith"));
        assert_eq!(config.api_url, "https://api.github.com");
        assert!(config.token.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_client_config_from_config() {
        let mut config = Config::default_config();
        config.api_url = Some("https://ghe.example.com/api/v3/".into());
        config.token = Some("secret".into());
        config.timeout = Some(10);

        let client_config = ClientConfig::from_config(&config);
        assert_eq!(client_config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(client_config.token.as_deref(), Some("secret"));
        assert_eq!(client_config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_rest_url() {
        let client = GithubClient::new(ClientConfig::default());
        assert_eq!(
            client.rest_url("/repos/o/a/labels"),
            "https://api.github.com/repos/o/a/labels"
        );
    }

    #[test]
    fn test_unwrap_graphql_prefers_errors() {
        let response: GraphqlResponse<Value> = serde_json::from_str(
            r#"{"data": null, "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a Repository"}]}"#,
        )
        .unwrap();
        assert_eq!(
            unwrap_graphql(response, "repository 'o/a'").unwrap_err(),
            ApiError::not_found("repository 'o/a'")
        );
    }

    #[test]
    fn test_unwrap_graphql_data() {
        let response: GraphqlResponse<Value> =
            serde_json::from_str(r#"{"data": {"viewer": {"login": "octocat"}}}"#).unwrap();
        let data = unwrap_graphql(response, "viewer").unwrap();
        assert_eq!(data["viewer"]["login"], "octocat");
    }

    #[test]
    fn test_unwrap_graphql_missing_data() {
        let response: GraphqlResponse<Value> = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            unwrap_graphql(response, "x"),
            Err(ApiError::Unclassified(_))
        ));
    }
}
