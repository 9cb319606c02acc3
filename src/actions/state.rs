use std::fmt;

use serde::Serialize;

use super::{Action, ActionContext};
use crate::dossier::{DossierRef, DossierState};
use crate::error::Result;
use crate::profile::Profile;

/// Target of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Construction,
    Instruction,
    Accepter,
    Refuser,
    ClasserSansSuite,
    Archiver,
}

impl StateChange {
    fn suffix(self) -> &'static str {
        match self {
            StateChange::Construction => "EnConstruction",
            StateChange::Instruction => "EnInstruction",
            StateChange::Accepter => "Accepter",
            StateChange::Refuser => "Refuser",
            StateChange::ClasserSansSuite => "ClasserSansSuite",
            StateChange::Archiver => "Archiver",
        }
    }

    /// `dossier` + `Passer`/`Repasser` for instruction/construction + suffix.
    pub fn operation_name(self) -> String {
        let prefix = match self {
            StateChange::Instruction => "Passer",
            StateChange::Construction => "Repasser",
            _ => "",
        };
        format!("dossier{prefix}{}", self.suffix())
    }

    /// Decisions carry a motivation; the other changes ignore it.
    pub fn takes_motivation(self) -> bool {
        matches!(
            self,
            StateChange::Accepter | StateChange::Refuser | StateChange::ClasserSansSuite
        )
    }

    /// Archiving keeps the state as is.
    pub fn resulting_state(self) -> Option<DossierState> {
        match self {
            StateChange::Construction => Some(DossierState::EnConstruction),
            StateChange::Instruction => Some(DossierState::EnInstruction),
            StateChange::Accepter => Some(DossierState::Accepte),
            StateChange::Refuser => Some(DossierState::Refuse),
            StateChange::ClasserSansSuite => Some(DossierState::SansSuite),
            StateChange::Archiver => None,
        }
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateInput {
    dossier_id: String,
    instructeur_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    motivation: Option<String>,
}

/// Moves a dossier to another state.
#[derive(Debug, Clone)]
pub struct StateModifier {
    ctx: ActionContext,
}

impl StateModifier {
    pub fn new(profile: &Profile, dossier: DossierRef, instructeur_id: Option<String>) -> Result<Self> {
        let ctx = ActionContext::new(profile, dossier, instructeur_id).inspect_err(|e| {
            tracing::error!(action = Self::HEADER, error = %e, "Cannot change state");
        })?;
        Ok(Self { ctx })
    }
}

impl Action for StateModifier {
    /// The change and its motivation.
    type Input = (StateChange, String);

    const HEADER: &'static str = "STATE_MODIFIER";

    fn context(&self) -> &ActionContext {
        &self.ctx
    }

    async fn try_perform(&mut self, (change, motivation): Self::Input) -> Result<()> {
        let input = StateInput {
            dossier_id: self.ctx.dossier().id.clone(),
            instructeur_id: self.ctx.instructeur_id().to_string(),
            motivation: change.takes_motivation().then_some(motivation),
        };
        self.ctx.mutate(&change.operation_name(), input).await?;
        tracing::debug!(dossier = %self.ctx.dossier().id, state = %change, "State changed");
        Ok(())
    }
}
