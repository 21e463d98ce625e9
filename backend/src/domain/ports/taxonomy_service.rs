//! Driving port for tag and ingredient management.

use async_trait::async_trait;

use crate::domain::{Error, TaxonomyItem, TaxonomyItemId, TaxonomyKind, UserId};

#[async_trait]
pub trait TaxonomyService: Send + Sync {
    /// Owner's items of `kind`, name descending.
    async fn list(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        assigned_only: bool,
    ) -> Result<Vec<TaxonomyItem>, Error>;

    async fn get(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<TaxonomyItem, Error>;

    async fn create(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        name: &str,
    ) -> Result<TaxonomyItem, Error>;

    async fn rename(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
        name: &str,
    ) -> Result<TaxonomyItem, Error>;

    async fn delete(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<(), Error>;
}
