use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::types::{GraphqlRequest, GraphqlResponse};
use crate::error::{DemarchesError, Result};
use crate::profile::Profile;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP side of the GraphQL exchange.
#[derive(Clone)]
pub struct GraphqlClient {
    api_token: String,
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GraphqlClient {
    pub fn new(profile: &Profile) -> Self {
        Self::with_endpoint(profile.api_token.clone(), profile.endpoint.clone())
    }

    pub fn with_endpoint(api_token: String, endpoint: String) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_token,
            client,
            endpoint,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upper bound on a whole request, connection included.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Posts the request and returns the `data` subtree.
    pub async fn execute(&self, req: &GraphqlRequest) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(DemarchesError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<GraphqlResponse>().await?;
        if !body.errors.is_empty() {
            return Err(DemarchesError::from_graphql_errors(body.errors));
        }

        match body.data {
            Some(Value::Null) | None => Err(DemarchesError::MissingData(
                req.operation_name
                    .clone()
                    .unwrap_or_else(|| "data".to_string()),
            )),
            Some(data) => Ok(data),
        }
    }
}
