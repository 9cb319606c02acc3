//! Client for the Démarches Simplifiées GraphQL API.
//!
//! Procedures ([`Demarche`]) and case files ([`Dossier`]) are fetched
//! lazily and cached; [`actions`] change a dossier on behalf of an
//! instructeur.
//!
//! # Example
//!
//! ```rust,ignore
//! use demarches::actions::{Action, StateChange, StateModifier};
//! use demarches::{Demarche, Profile};
//!
//! let profile = Profile::load()?;
//! let mut demarche = Demarche::new(42, &profile)?;
//! for dossier in demarche.dossiers().await? {
//!     let target = dossier.target().await?;
//!     let mut action = StateModifier::new(&profile, target, None)?;
//!     action.perform((StateChange::Instruction, String::new())).await;
//! }
//! ```

pub mod actions;
pub mod data;
pub mod demarche;
pub mod dossier;
pub mod error;
pub mod graphql;
pub mod profile;

pub use demarche::Demarche;
pub use dossier::{Annotation, Dossier, DossierRef, DossierState};
pub use error::{DemarchesError, Result};
pub use profile::Profile;
