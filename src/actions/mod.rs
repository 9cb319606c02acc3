//! Operations performed on a dossier through the platform's mutations.
//!
//! Each action binds a [`RequestBuilder`] on the mutation document to a
//! target dossier and the instructeur acting on it. [`Action::perform`]
//! reports a plain [`ActionStatus`] and logs the outcome;
//! [`Action::try_perform`] hands back the typed error instead.

mod annotation;
mod message;
mod state;

pub use annotation::{AnnotationModifier, AnnotationValue};
pub use message::MessageSender;
pub use state::{StateChange, StateModifier};

use serde::Serialize;
use serde_json::Value;

use crate::dossier::DossierRef;
use crate::error::{DemarchesError, Result};
use crate::graphql::{QueryTemplate, RequestBuilder};
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    Error,
}

impl ActionStatus {
    pub const fn code(self) -> u8 {
        match self {
            ActionStatus::Success => 0,
            ActionStatus::Error => 1,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ActionStatus::Success)
    }
}

/// Request, target and actor shared by every action.
#[derive(Debug, Clone)]
pub struct ActionContext {
    request: RequestBuilder,
    dossier: DossierRef,
    instructeur_id: String,
}

impl ActionContext {
    /// An explicit `instructeur_id` wins over the profile's.
    pub fn new(profile: &Profile, dossier: DossierRef, instructeur_id: Option<String>) -> Result<Self> {
        let instructeur_id = instructeur_id
            .or_else(|| profile.instructeur_id.clone())
            .ok_or(DemarchesError::MissingInstructeurId)?;
        Ok(Self {
            request: RequestBuilder::new(profile, QueryTemplate::Actions),
            dossier,
            instructeur_id,
        })
    }

    pub fn dossier(&self) -> &DossierRef {
        &self.dossier
    }

    pub fn instructeur_id(&self) -> &str {
        &self.instructeur_id
    }

    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// Runs `operation` with `input` and checks the mutation payload.
    pub(crate) async fn mutate(&mut self, operation: &str, input: impl Serialize) -> Result<Value> {
        self.request.add_variable("input", input)?;
        self.request.set_operation_name(operation);
        let data = self.request.send().await?;
        check_payload(&data, operation)?;
        Ok(data)
    }
}

/// Mutation payloads report business rejections in their own `errors`
/// list, next to a successful HTTP and GraphQL response.
fn check_payload(data: &Value, operation: &str) -> Result<()> {
    let payload = match data.get(operation) {
        Some(Value::Null) | None => {
            return Err(DemarchesError::MissingData(operation.to_string()));
        }
        Some(payload) => payload,
    };

    let messages: Vec<String> = payload
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(DemarchesError::Mutation {
            operation: operation.to_string(),
            messages,
        })
    }
}

#[allow(async_fn_in_trait)]
pub trait Action {
    type Input;

    /// Name under which the action logs.
    const HEADER: &'static str;

    fn context(&self) -> &ActionContext;

    async fn try_perform(&mut self, input: Self::Input) -> Result<()>;

    /// Like [`try_perform`](Self::try_perform), but logs the error and
    /// reports it as [`ActionStatus::Error`].
    async fn perform(&mut self, input: Self::Input) -> ActionStatus {
        match self.try_perform(input).await {
            Ok(()) => {
                tracing::info!(
                    action = Self::HEADER,
                    dossier = %self.context().dossier().id,
                    "Action performed"
                );
                ActionStatus::Success
            }
            Err(e) => {
                tracing::warn!(
                    action = Self::HEADER,
                    dossier = %self.context().dossier().id,
                    error = %e,
                    "Action failed"
                );
                ActionStatus::Error
            }
        }
    }
}
