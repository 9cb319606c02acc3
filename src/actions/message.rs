use serde::Serialize;

use super::{Action, ActionContext};
use crate::dossier::DossierRef;
use crate::error::Result;
use crate::profile::Profile;

const OPERATION: &str = "dossierEnvoyerMessage";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageInput<'a> {
    dossier_id: &'a str,
    instructeur_id: &'a str,
    body: &'a str,
}

/// Sends a message to the applicant of a dossier.
#[derive(Debug, Clone)]
pub struct MessageSender {
    ctx: ActionContext,
}

impl MessageSender {
    pub fn new(profile: &Profile, dossier: DossierRef, instructeur_id: Option<String>) -> Result<Self> {
        Ok(Self {
            ctx: ActionContext::new(profile, dossier, instructeur_id)?,
        })
    }
}

impl Action for MessageSender {
    type Input = String;

    const HEADER: &'static str = "MESSAGE_SENDER";

    fn context(&self) -> &ActionContext {
        &self.ctx
    }

    async fn try_perform(&mut self, body: String) -> Result<()> {
        let dossier_id = self.ctx.dossier().id.clone();
        let instructeur_id = self.ctx.instructeur_id().to_string();
        let input = MessageInput {
            dossier_id: &dossier_id,
            instructeur_id: &instructeur_id,
            body: &body,
        };
        self.ctx.mutate(OPERATION, input).await?;
        tracing::debug!(dossier = %dossier_id, "Message sent");
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

    #[tokio::test]
    async fn perform_sends_the_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "dossierEnvoyerMessage",
                "variables": {"input": {
                    "dossierId": "RG9zc2llci0xMjM=",
                    "instructeurId": "inst-1",
                    "body": "Merci de compléter votre dossier."
                }}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "dossierEnvoyerMessage": {"message": {"id": "m1", "body": "..."}, "errors": null}
            }})))
            .expect(1)
            .mount(&server)
            .await;

        let profile = Profile::new("tok")
            .with_endpoint(server.uri())
            .with_instructeur_id("inst-1");
        let mut sender = MessageSender::new(&profile, target(), None).unwrap();
        let status = sender
            .perform("Merci de compléter votre dossier.".into())
            .await;
        assert_eq!(status, ActionStatus::Success);
    }

    #[tokio::test]
    async fn perform_reports_api_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let profile = Profile::new("tok").with_endpoint(server.uri());
        let mut sender = MessageSender::new(&profile, target(), Some("inst-1".into())).unwrap();
        assert_eq!(sender.perform("hello".into()).await, ActionStatus::Error);
    }

    #[test]
    fn new_requires_an_instructeur() {
        assert!(MessageSender::new(&Profile::new("tok"), target(), None).is_err());
    }
}
