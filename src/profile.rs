//! Credentials and endpoint used to talk to the Démarches Simplifiées API.
//!
//! A [`Profile`] can be built by hand or loaded from `demarches.toml`.
//! The `DEMARCHES_API_TOKEN` and `DEMARCHES_INSTRUCTEUR_ID` environment
//! variables take precedence over the file.

use serde::Deserialize;
use std::path::Path;

use crate::error::{DemarchesError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://www.demarches-simplifiees.fr/api/v2/graphql";

const CONFIG_FILE: &str = "demarches.toml";

#[derive(Clone, Deserialize)]
pub struct Profile {
    /// Bearer token of the API account.
    #[serde(default)]
    pub api_token: String,

    /// Instructeur on whose behalf actions are performed.
    #[serde(default)]
    pub instructeur_id: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

// The token never goes to logs.
impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("api_token", &"***")
            .field("instructeur_id", &self.instructeur_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Profile {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            instructeur_id: None,
            endpoint: default_endpoint(),
        }
    }

    pub fn with_instructeur_id(mut self, instructeur_id: impl Into<String>) -> Self {
        self.instructeur_id = Some(instructeur_id.into());
        self
    }

    /// Point the profile at another GraphQL endpoint (staging, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_instructeur_id(&self) -> bool {
        self.instructeur_id.is_some()
    }

    pub fn instructeur_id(&self) -> Option<&str> {
        self.instructeur_id.as_deref()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let profile = toml::from_str::<Profile>(contents)?;
        profile.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads `demarches.toml` from the current directory, then applies the
    /// environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
    }

    /// `env` looks up a variable; empty values count as unset.
    fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut profile = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<Profile>(&contents)?
        } else {
            Self::new(String::new())
        };

        if let Some(token) = env("DEMARCHES_API_TOKEN")
            && !token.is_empty()
        {
            profile.api_token = token;
        }
        if let Some(id) = env("DEMARCHES_INSTRUCTEUR_ID")
            && !id.is_empty()
        {
            profile.instructeur_id = Some(id);
        }

        profile.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.api_token.trim().is_empty() {
            return Err(DemarchesError::Config("api_token is empty".into()));
        }
        if self.instructeur_id.as_deref().is_some_and(|id| id.is_empty()) {
            return Err(DemarchesError::Config("instructeur_id is empty".into()));
        }
        Ok(self)
    }
}
