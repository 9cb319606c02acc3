use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::client::GraphqlClient;
use super::query::QueryTemplate;
use super::types::GraphqlRequest;
use crate::error::Result;
use crate::profile::Profile;

/// Assembles a GraphQL request from a document and a mutable variable set,
/// then sends it.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: GraphqlClient,
    query: Cow<'static, str>,
    variables: Map<String, Value>,
    operation_name: Option<String>,
}

impl RequestBuilder {
    pub fn new(profile: &Profile, template: QueryTemplate) -> Self {
        Self::with_query(profile, Cow::Borrowed(template.text()))
    }

    /// Reads the GraphQL document from a file.
    pub fn from_file(profile: &Profile, path: impl AsRef<Path>) -> Result<Self> {
        let query = std::fs::read_to_string(path)?;
        Ok(Self::with_query(profile, Cow::Owned(query)))
    }

    fn with_query(profile: &Profile, query: Cow<'static, str>) -> Self {
        Self {
            client: GraphqlClient::new(profile),
            query,
            variables: Map::new(),
            operation_name: None,
        }
    }

    /// Sets `name`, replacing any previous value.
    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Serialize) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        self.variables.insert(name.into(), value);
        Ok(self)
    }

    pub fn is_variable_set(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_operation_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// The body [`send`](Self::send) posts.
    pub fn body(&self) -> GraphqlRequest {
        GraphqlRequest {
            query: self.query.to_string(),
            operation_name: self.operation_name.clone(),
            variables: self.variables.clone(),
        }
    }

    pub async fn send(&self) -> Result<Value> {
        self.send_with(&self.body()).await
    }

    /// Sends a caller-built body through this builder's client.
    pub async fn send_with(&self, body: &GraphqlRequest) -> Result<Value> {
        tracing::debug!(
            operation = body.operation_name.as_deref().unwrap_or("<anonymous>"),
            variables = ?body.variables.keys().collect::<Vec<_>>(),
            endpoint = self.client.endpoint(),
            "Sending GraphQL request"
        );
        self.client.execute(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemarchesError;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> Profile {
        Profile::new("tok")
    }

    #[test]
    fn variables_can_be_set_and_overwritten() {
        let mut req = RequestBuilder::new(&profile(), QueryTemplate::Demarche);
        assert!(!req.is_variable_set("demarcheNumber"));

        req.add_variable("demarcheNumber", 42).unwrap();
        assert!(req.is_variable_set("demarcheNumber"));
        assert_eq!(req.variable("demarcheNumber"), Some(&json!(42)));

        req.add_variable("demarcheNumber", 43).unwrap();
        assert_eq!(req.variables().len(), 1);
        assert_eq!(req.variable("demarcheNumber"), Some(&json!(43)));

        assert_eq!(req.remove_variable("demarcheNumber"), Some(json!(43)));
        assert!(!req.is_variable_set("demarcheNumber"));
    }

    #[test]
    fn add_variable_accepts_structs() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Input {
            dossier_id: String,
        }

        let mut req = RequestBuilder::new(&profile(), QueryTemplate::Actions);
        req.add_variable("input", Input { dossier_id: "abc".into() })
            .unwrap();
        assert_eq!(req.variable("input"), Some(&json!({"dossierId": "abc"})));
    }

    #[test]
    fn body_carries_query_variables_and_operation() {
        let mut req = RequestBuilder::new(&profile(), QueryTemplate::Actions);
        req.add_variable("input", json!({"dossierId": "x"})).unwrap();
        req.set_operation_name("dossierAccepter");

        let body = req.body();
        assert_eq!(body.query, QueryTemplate::Actions.text());
        assert_eq!(body.operation_name.as_deref(), Some("dossierAccepter"));
        assert_eq!(body.variables["input"]["dossierId"], "x");
        assert_eq!(req.operation_name(), Some("dossierAccepter"));
    }

    #[test]
    fn from_file_loads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "query custom {{ demarche(number: 1) {{ id }} }}").unwrap();

        let req = RequestBuilder::from_file(&profile(), file.path()).unwrap();
        assert_eq!(req.query(), "query custom { demarche(number: 1) { id } }");
    }

    #[test]
    fn from_file_missing_template() {
        let err = RequestBuilder::from_file(&profile(), "/nonexistent/query.graphql").unwrap_err();
        assert!(matches!(err, DemarchesError::Io(_)));
    }

    #[tokio::test]
    async fn send_posts_the_body() {
        let server = MockServer::start().await;
        let mut req = RequestBuilder::new(
            &profile().with_endpoint(server.uri()),
            QueryTemplate::Dossier,
        );
        req.add_variable("dossierNumber", 7).unwrap();

        Mock::given(method("POST"))
            .and(body_json(json!({
                "query": QueryTemplate::Dossier.text(),
                "variables": {"dossierNumber": 7}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"dossier": {"number": 7}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let data = req.send().await.unwrap();
        assert_eq!(data["dossier"]["number"], 7);
    }

    #[tokio::test]
    async fn send_with_uses_custom_body() {
        let server = MockServer::start().await;
        let req = RequestBuilder::new(&profile().with_endpoint(server.uri()), QueryTemplate::Actions);
        let mut body = req.body();
        body.operation_name = Some("dossierArchiver".into());

        Mock::given(method("POST"))
            .and(body_json(serde_json::to_value(&body).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .expect(1)
            .mount(&server)
            .await;

        let data = req.send_with(&body).await.unwrap();
        assert_eq!(data["ok"], true);
    }
}
