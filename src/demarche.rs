//! Procedures (démarches) and the dossiers filed against them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::data::Resource;
use crate::dossier::Dossier;
use crate::error::{DemarchesError, Result};
use crate::graphql::{QueryTemplate, RequestBuilder};
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemarcheState {
    Brouillon,
    Publiee,
    Close,
    Depubliee,
    #[serde(other)]
    Unknown,
}

/// Description of a field of the procedure's form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChampDescriptor {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub champ_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub champ_descriptors: Vec<ChampDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instructeur {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupeInstructeur {
    pub id: String,
    #[serde(default)]
    pub number: Option<i64>,
    pub label: String,
    /// Absent unless the request asked for instructeurs.
    #[serde(default)]
    pub instructeurs: Option<Vec<Instructeur>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DossierListing {
    pub id: String,
    pub number: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DossierConnection {
    pub nodes: Vec<DossierListing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemarcheNode {
    pub id: String,
    pub number: i64,
    #[serde(default)]
    pub title: String,
    pub state: Option<DemarcheState>,
    #[serde(default)]
    pub date_creation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_revision: Option<Revision>,
    #[serde(default)]
    pub groupe_instructeurs: Option<Vec<GroupeInstructeur>>,
    pub dossiers: DossierConnection,
}

impl fmt::Display for DemarcheNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id : {} Number : {}", self.id, self.number)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemarcheEnvelope {
    pub demarche: DemarcheNode,
}

pub struct Demarche {
    number: i64,
    profile: Profile,
    resource: Resource<DemarcheEnvelope>,
    dossiers: Vec<Dossier>,
}

impl Demarche {
    pub fn new(number: i64, profile: &Profile) -> Result<Self> {
        let mut request = RequestBuilder::new(profile, QueryTemplate::Demarche);
        request.add_variable("demarcheNumber", number)?;
        tracing::debug!(number, "Demarche created");
        Ok(Self {
            number,
            profile: profile.clone(),
            resource: Resource::new(request),
            dossiers: Vec::new(),
        })
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub async fn node(&mut self) -> Result<&DemarcheNode> {
        Ok(&self.resource.data().await?.demarche)
    }

    pub async fn force_fetch(&mut self) -> Result<&DemarcheNode> {
        Ok(&self.resource.force_fetch().await?.demarche)
    }

    pub async fn id(&mut self) -> Result<String> {
        Ok(self.node().await?.id.clone())
    }

    pub async fn title(&mut self) -> Result<String> {
        Ok(self.node().await?.title.clone())
    }

    pub async fn state(&mut self) -> Result<Option<DemarcheState>> {
        Ok(self.node().await?.state)
    }

    /// `(id, number)` of every dossier listed by the procedure.
    pub async fn dossier_infos(&mut self) -> Result<Vec<(String, i64)>> {
        Ok(self
            .node()
            .await?
            .dossiers
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.number))
            .collect())
    }

    pub async fn dossiers_count(&mut self) -> Result<usize> {
        Ok(self.node().await?.dossiers.nodes.len())
    }

    /// Dossier handles, rebuilt only when the listing size changed.
    pub async fn dossiers(&mut self) -> Result<&mut [Dossier]> {
        let infos = self.dossier_infos().await?;
        if self.dossiers.is_empty() || self.dossiers.len() != infos.len() {
            self.dossiers = infos
                .into_iter()
                .map(|(id, number)| Dossier::with_id(number, id, &self.profile))
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(&mut self.dossiers)
    }

    /// Field descriptors of the active revision. Refetches with the revision
    /// included until a response carrying it is cached.
    pub async fn fields(&mut self) -> Result<&[ChampDescriptor]> {
        let cached = self.resource.request().is_variable_set("includeRevision")
            && self.node().await?.active_revision.is_some();
        if !cached {
            self.resource
                .request_mut()
                .add_variable("includeRevision", true)?;
            self.force_fetch().await?;
        }
        self.node()
            .await?
            .active_revision
            .as_ref()
            .map(|r| r.champ_descriptors.as_slice())
            .ok_or_else(|| DemarchesError::MissingData("activeRevision".into()))
    }

    pub async fn groupe_instructeurs(&mut self) -> Result<&[GroupeInstructeur]> {
        let cached = self.resource.request().is_variable_set("includeInstructeurs")
            && self.node().await?.groupe_instructeurs.is_some();
        if !cached {
            self.resource
                .request_mut()
                .add_variable("includeInstructeurs", true)?
                .add_variable("includeGroupeInstructeurs", true)?;
            self.force_fetch().await?;
        }
        self.node()
            .await?
            .groupe_instructeurs
            .as_deref()
            .ok_or_else(|| DemarchesError::MissingData("groupeInstructeurs".into()))
    }

    /// Instructeurs of every group, in group order.
    pub async fn instructeurs(&mut self) -> Result<Vec<Instructeur>> {
        Ok(self
            .groupe_instructeurs()
            .await?
            .iter()
            .flat_map(|g| g.instructeurs.iter().flatten().cloned())
            .collect())
    }
}
