use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{Action, ActionContext};
use crate::dossier::{Annotation, DossierRef};
use crate::error::{DemarchesError, Result};
use crate::profile::Profile;

/// Value written to an annotation; the variant picks the mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Text(String),
    Checkbox(bool),
    Integer(i64),
    Date(NaiveDate),
}

impl AnnotationValue {
    pub fn operation_name(&self) -> &'static str {
        match self {
            AnnotationValue::Text(_) => "dossierModifierAnnotationText",
            AnnotationValue::Checkbox(_) => "dossierModifierAnnotationCheckbox",
            AnnotationValue::Integer(_) => "dossierModifierAnnotationIntegerNumber",
            AnnotationValue::Date(_) => "dossierModifierAnnotationDate",
        }
    }

    fn to_json(&self) -> Value {
        match self {
            AnnotationValue::Text(s) => Value::String(s.clone()),
            AnnotationValue::Checkbox(b) => Value::Bool(*b),
            AnnotationValue::Integer(n) => Value::from(*n),
            AnnotationValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::Text(s.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::Text(s)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Checkbox(b)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationInput {
    dossier_id: String,
    instructeur_id: String,
    annotation_id: String,
    value: Value,
}

/// Writes a private annotation of a dossier.
#[derive(Debug, Clone)]
pub struct AnnotationModifier {
    ctx: ActionContext,
}

impl AnnotationModifier {
    pub fn new(profile: &Profile, dossier: DossierRef, instructeur_id: Option<String>) -> Result<Self> {
        Ok(Self {
            ctx: ActionContext::new(profile, dossier, instructeur_id)?,
        })
    }
}

impl Action for AnnotationModifier {
    /// The annotation and the value to write. Without a value, the
    /// annotation's own `string_value` is written as text.
    type Input = (Annotation, Option<AnnotationValue>);

    const HEADER: &'static str = "ANNOTATION_MODIFIER";

    fn context(&self) -> &ActionContext {
        &self.ctx
    }

    async fn try_perform(&mut self, (annotation, value): Self::Input) -> Result<()> {
        if annotation.id.is_empty() {
            return Err(DemarchesError::InvalidAnnotation(
                "annotation has no id".to_string(),
            ));
        }
        let value = match (value, annotation.string_value) {
            (Some(v), _) => v,
            (None, Some(current)) => AnnotationValue::Text(current),
            (None, None) => {
                return Err(DemarchesError::InvalidAnnotation(format!(
                    "no value to set for annotation {}",
                    annotation.id
                )));
            }
        };

        let input = AnnotationInput {
            dossier_id: self.ctx.dossier().id.clone(),
            instructeur_id: self.ctx.instructeur_id().to_string(),
            annotation_id: annotation.id,
            value: value.to_json(),
        };
        self.ctx.mutate(value.operation_name(), input).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target() -> DossierRef {
        DossierRef {
            id: "RG9zc2llci0xMjM=".into(),
            number: 123,
        }
    }

    fn modifier(server: &MockServer) -> AnnotationModifier {
        let profile = Profile::new("tok")
            .with_endpoint(server.uri())
            .with_instructeur_id("inst-1");
        AnnotationModifier::new(&profile, target(), None).unwrap()
    }

    #[test]
    fn operation_names_follow_value_kind() {
        assert_eq!(
            AnnotationValue::from("x").operation_name(),
            "dossierModifierAnnotationText"
        );
        assert_eq!(
            AnnotationValue::from(true).operation_name(),
            "dossierModifierAnnotationCheckbox"
        );
        assert_eq!(
            AnnotationValue::Integer(3).operation_name(),
            "dossierModifierAnnotationIntegerNumber"
        );
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(
            AnnotationValue::Date(date).operation_name(),
            "dossierModifierAnnotationDate"
        );
        assert_eq!(AnnotationValue::Date(date).to_json(), json!("2024-05-17"));
    }

    #[tokio::test]
    async fn default_value_comes_from_the_annotation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "dossierModifierAnnotationText",
                "variables": {"input": {
                    "dossierId": "RG9zc2llci0xMjM=",
                    "instructeurId": "inst-1",
                    "annotationId": "Q2hhbXAtOQ==",
                    "value": "favorable"
                }}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "dossierModifierAnnotationText": {"annotation": {"id": "Q2hhbXAtOQ=="}, "errors": []}
            }})))
            .expect(1)
            .mount(&server)
            .await;

        let annotation = Annotation::new("Q2hhbXAtOQ==").with_value("favorable");
        let status = modifier(&server).perform((annotation, None)).await;
        assert_eq!(status, ActionStatus::Success);
    }

    #[tokio::test]
    async fn explicit_value_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "dossierModifierAnnotationCheckbox",
                "variables": {"input": {"annotationId": "Q2hhbXAtOQ==", "value": true}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "dossierModifierAnnotationCheckbox": {"annotation": {"id": "Q2hhbXAtOQ=="}, "errors": null}
            }})))
            .expect(1)
            .mount(&server)
            .await;

        let annotation = Annotation::new("Q2hhbXAtOQ==").with_value("false");
        modifier(&server)
            .try_perform((annotation, Some(true.into())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn annotation_without_value_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut action = modifier(&server);
        let err = action
            .try_perform((Annotation::new("Q2hhbXAtOQ=="), None))
            .await
            .unwrap_err();
        assert!(matches!(err, DemarchesError::InvalidAnnotation(_)));
        assert_eq!(
            action.perform((Annotation::new(""), Some("x".into()))).await,
            ActionStatus::Error
        );
    }

    #[tokio::test]
    async fn platform_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "dossierModifierAnnotationText": {
                    "annotation": null,
                    "errors": [{"message": "L’annotation n’existe pas"}]
                }
            }})))
            .mount(&server)
            .await;

        let err = modifier(&server)
            .try_perform((Annotation::new("bad"), Some("x".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, DemarchesError::Mutation { .. }));
    }
}
