//! Lazily fetched, cached remote data.
//!
//! [`Resource`] is the common base of [`Demarche`](crate::Demarche) and
//! [`Dossier`](crate::Dossier): it owns the request that describes the
//! entity and keeps the last typed response until asked to refetch.

use serde::de::DeserializeOwned;

use crate::error::{DemarchesError, Result};
use crate::graphql::RequestBuilder;

#[derive(Debug, Clone)]
pub struct Resource<T> {
    request: RequestBuilder,
    data: Option<T>,
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(request: RequestBuilder) -> Self {
        Self {
            request,
            data: None,
        }
    }

    /// Returns the cached data, fetching it on first access.
    pub async fn data(&mut self) -> Result<&T> {
        if self.data.is_none() {
            self.fetch().await?;
        }
        self.data
            .as_ref()
            .ok_or_else(|| DemarchesError::MissingData("resource".into()))
    }

    /// Fetches again, replacing whatever was cached.
    pub async fn force_fetch(&mut self) -> Result<&T> {
        self.fetch().await?;
        self.data
            .as_ref()
            .ok_or_else(|| DemarchesError::MissingData("resource".into()))
    }

    async fn fetch(&mut self) -> Result<()> {
        let raw = self.request.send().await?;
        self.data = Some(serde_json::from_value(raw)?);
        tracing::debug!(
            operation = self.request.operation_name().unwrap_or("<anonymous>"),
            "Resource fetched"
        );
        Ok(())
    }

    pub fn is_fetched(&self) -> bool {
        self.data.is_some()
    }

    pub fn invalidate(&mut self) {
        self.data = None;
    }

    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// Mutable access to the request; the cache is kept until the next
    /// [`force_fetch`](Self::force_fetch).
    pub fn request_mut(&mut self) -> &mut RequestBuilder {
        &mut self.request
    }
}
