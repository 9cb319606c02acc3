//! Case files (dossiers) of a procedure.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::Resource;
use crate::error::Result;
use crate::graphql::{QueryTemplate, RequestBuilder};
use crate::profile::Profile;

/// State of a dossier as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DossierState {
    EnConstruction,
    EnInstruction,
    Accepte,
    Refuse,
    SansSuite,
    /// A state this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl DossierState {
    /// Accepted, refused and closed dossiers no longer move without being
    /// sent back to instruction.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DossierState::Accepte | DossierState::Refuse | DossierState::SansSuite
        )
    }
}

impl fmt::Display for DossierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DossierState::EnConstruction => write!(f, "en_construction"),
            DossierState::EnInstruction => write!(f, "en_instruction"),
            DossierState::Accepte => write!(f, "accepte"),
            DossierState::Refuse => write!(f, "refuse"),
            DossierState::SansSuite => write!(f, "sans_suite"),
            DossierState::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A field filled in by the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Champ {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub string_value: Option<String>,
    /// Only set for attachment fields.
    #[serde(default)]
    pub files: Vec<FileRef>,
}

/// A private annotation, visible to instructeurs only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub string_value: Option<String>,
}

impl Annotation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            string_value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.string_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usager {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemarcheNumber {
    pub number: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierNode {
    pub id: String,
    pub number: i64,
    pub state: DossierState,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub date_depot: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_derniere_modification: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pdf: Option<FileRef>,
    #[serde(default)]
    pub usager: Option<Usager>,
    #[serde(default)]
    pub demarche: Option<DemarcheNumber>,
    #[serde(default)]
    pub champs: Vec<Champ>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DossierEnvelope {
    pub dossier: DossierNode,
}

/// What an action needs to know about its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DossierRef {
    pub id: String,
    pub number: i64,
}

/// A dossier, fetched on first access.
#[derive(Debug, Clone)]
pub struct Dossier {
    number: i64,
    id: Option<String>,
    resource: Resource<DossierEnvelope>,
}

impl Dossier {
    pub fn new(number: i64, profile: &Profile) -> Result<Self> {
        let mut request = RequestBuilder::new(profile, QueryTemplate::Dossier);
        request.add_variable("dossierNumber", number)?;
        tracing::debug!(number, "Dossier created");
        Ok(Self {
            number,
            id: None,
            resource: Resource::new(request),
        })
    }

    /// A dossier whose remote id is already known, as listed by a démarche.
    pub fn with_id(number: i64, id: impl Into<String>, profile: &Profile) -> Result<Self> {
        let mut dossier = Self::new(number, profile)?;
        dossier.id = Some(id.into());
        Ok(dossier)
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    /// The remote id; only hits the API when it was not given up front.
    pub async fn id(&mut self) -> Result<String> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        let id = self.node().await?.id.clone();
        self.id = Some(id.clone());
        Ok(id)
    }

    pub async fn target(&mut self) -> Result<DossierRef> {
        Ok(DossierRef {
            id: self.id().await?,
            number: self.number,
        })
    }

    pub async fn node(&mut self) -> Result<&DossierNode> {
        Ok(&self.resource.data().await?.dossier)
    }

    /// Refetches, e.g. after an action changed the dossier.
    pub async fn force_fetch(&mut self) -> Result<&DossierNode> {
        Ok(&self.resource.force_fetch().await?.dossier)
    }

    pub async fn state(&mut self) -> Result<DossierState> {
        Ok(self.node().await?.state)
    }

    pub async fn archived(&mut self) -> Result<bool> {
        Ok(self.node().await?.archived)
    }

    pub async fn date_depot(&mut self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.node().await?.date_depot)
    }

    pub async fn usager_email(&mut self) -> Result<Option<String>> {
        Ok(self.node().await?.usager.as_ref().map(|u| u.email.clone()))
    }

    pub async fn fields(&mut self) -> Result<&[Champ]> {
        Ok(&self.node().await?.champs)
    }

    pub async fn field(&mut self, label: &str) -> Result<Option<&Champ>> {
        Ok(self.fields().await?.iter().find(|c| c.label == label))
    }

    pub async fn annotations(&mut self) -> Result<&[Annotation]> {
        Ok(&self.node().await?.annotations)
    }

    pub async fn annotation(&mut self, label: &str) -> Result<Option<&Annotation>> {
        Ok(self.annotations().await?.iter().find(|a| a.label == label))
    }

    pub async fn pdf_url(&mut self) -> Result<Option<String>> {
        Ok(self.node().await?.pdf.as_ref().map(|f| f.url.clone()))
    }

    /// Every file attached to the dossier's fields.
    pub async fn attachments(&mut self) -> Result<Vec<FileRef>> {
        Ok(self
            .fields()
            .await?
            .iter()
            .flat_map(|c| c.files.iter().cloned())
            .collect())
    }
}
