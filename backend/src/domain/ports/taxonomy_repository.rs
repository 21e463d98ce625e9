//! Port for tag and ingredient persistence.
//!
//! Every operation is scoped to one owner and one kind; an item of another
//! owner or kind behaves as if it did not exist.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{TaxonomyItem, TaxonomyItemId, TaxonomyKind, TaxonomyName, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by taxonomy repository adapters.
    pub enum TaxonomyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "taxonomy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "taxonomy repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Owner's items of `kind`, in ascending id order. With `assigned_only`,
    /// only items referenced by at least one of the owner's recipes.
    async fn list(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        assigned_only: bool,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError>;

    async fn find(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError>;

    /// Owned items of `kind` among `ids`, ascending by id. Unknown ids are
    /// skipped.
    async fn find_many(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        ids: &BTreeSet<TaxonomyItemId>,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError>;

    async fn insert(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        name: &TaxonomyName,
    ) -> Result<TaxonomyItem, TaxonomyRepositoryError>;

    /// Returns `None` when the item is not the owner's.
    async fn rename(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
        name: &TaxonomyName,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError>;

    /// Delete the item and its recipe links. Returns whether it existed.
    async fn delete(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<bool, TaxonomyRepositoryError>;
}
