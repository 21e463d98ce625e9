//! Tag and ingredient domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::listing::sort_items_by_name_desc;
use crate::domain::ports::{TaxonomyRepository, TaxonomyRepositoryError, TaxonomyService};
use crate::domain::{
    Error, TaxonomyItem, TaxonomyItemId, TaxonomyKind, TaxonomyName, TaxonomyValidationError,
    UserId,
};

fn map_repository_error(error: TaxonomyRepositoryError) -> Error {
    match error {
        TaxonomyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("taxonomy repository unavailable: {message}"))
        }
        TaxonomyRepositoryError::Query { message } => {
            Error::internal(format!("taxonomy repository error: {message}"))
        }
    }
}

fn map_name_error(error: &TaxonomyValidationError) -> Error {
    let code = match error {
        TaxonomyValidationError::EmptyName => "blank",
        TaxonomyValidationError::NameTooLong { .. } => "too_long",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": "name", "code": code }))
}

fn not_found(kind: TaxonomyKind, id: TaxonomyItemId) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

/// Taxonomy service backed by a [`TaxonomyRepository`].
#[derive(Clone)]
pub struct TaxonomyServiceImpl<R> {
    repo: Arc<R>,
}

impl<R> TaxonomyServiceImpl<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> TaxonomyService for TaxonomyServiceImpl<R>
where
    R: TaxonomyRepository,
{
    async fn list(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        assigned_only: bool,
    ) -> Result<Vec<TaxonomyItem>, Error> {
        let mut items = self
            .repo
            .list(owner, kind, assigned_only)
            .await
            .map_err(map_repository_error)?;
        sort_items_by_name_desc(&mut items);
        Ok(items)
    }

    async fn get(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<TaxonomyItem, Error> {
        self.repo
            .find(owner, kind, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(kind, id))
    }

    async fn create(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        name: &str,
    ) -> Result<TaxonomyItem, Error> {
        let name = TaxonomyName::new(name).map_err(|err| map_name_error(&err))?;
        let item = self
            .repo
            .insert(owner, kind, &name)
            .await
            .map_err(map_repository_error)?;
        info!(%kind, id = %item.id(), owner = %owner, "taxonomy item created");
        Ok(item)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
        name: &str,
    ) -> Result<TaxonomyItem, Error> {
        let name = TaxonomyName::new(name).map_err(|err| map_name_error(&err))?;
        self.repo
            .rename(owner, kind, id, &name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(kind, id))
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(owner, kind, id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(not_found(kind, id));
        }
        info!(%kind, %id, owner = %owner, "taxonomy item deleted");
        Ok(())
    }
}
