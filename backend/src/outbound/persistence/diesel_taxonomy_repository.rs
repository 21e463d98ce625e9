//! PostgreSQL-backed `TaxonomyRepository` for tags and ingredients.
//!
//! Both kinds share `taxonomy_items`; every query filters on owner and kind
//! so items of another owner or kind are invisible. Recipe links cascade on
//! delete.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TaxonomyRepository, TaxonomyRepositoryError};
use crate::domain::{TaxonomyItem, TaxonomyItemId, TaxonomyKind, TaxonomyName, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewTaxonomyItemRow, TaxonomyItemRow};
use super::pool::DbPool;
use super::schema::{recipe_taxonomy_items, taxonomy_items};

/// Diesel-backed implementation of the taxonomy repository port.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_taxonomy_error(error: &diesel::result::Error) -> TaxonomyRepositoryError {
    map_diesel_error(
        error,
        TaxonomyRepositoryError::query,
        TaxonomyRepositoryError::connection,
    )
}

pub(super) fn row_to_item(row: TaxonomyItemRow) -> Result<TaxonomyItem, TaxonomyRepositoryError> {
    let TaxonomyItemRow {
        id,
        user_id,
        kind,
        name,
    } = row;

    let kind = kind
        .parse::<TaxonomyKind>()
        .map_err(|err| TaxonomyRepositoryError::query(format!("stored kind: {err}")))?;
    let name = TaxonomyName::new(&name)
        .map_err(|err| TaxonomyRepositoryError::query(format!("stored name: {err}")))?;

    Ok(TaxonomyItem::new(
        TaxonomyItemId::new(id),
        UserId::from_uuid(user_id),
        kind,
        name,
    ))
}

fn rows_to_items(rows: Vec<TaxonomyItemRow>) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError> {
    rows.into_iter().map(row_to_item).collect()
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn list(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        assigned_only: bool,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let mut rows: Vec<TaxonomyItemRow> = taxonomy_items::table
            .filter(taxonomy_items::user_id.eq(owner.as_uuid()))
            .filter(taxonomy_items::kind.eq(kind.as_str()))
            .order(taxonomy_items::id.asc())
            .select(TaxonomyItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_taxonomy_error(&err))?;

        if assigned_only && !rows.is_empty() {
            let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
            // Links are only ever written for items the recipe owner owns.
            let linked: HashSet<i64> = recipe_taxonomy_items::table
                .filter(recipe_taxonomy_items::item_id.eq_any(&ids))
                .select(recipe_taxonomy_items::item_id)
                .load::<i64>(&mut conn)
                .await
                .map_err(|err| map_taxonomy_error(&err))?
                .into_iter()
                .collect();
            rows.retain(|row| linked.contains(&row.id));
        }

        rows_to_items(rows)
    }

    async fn find(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let row = taxonomy_items::table
            .filter(taxonomy_items::id.eq(id.value()))
            .filter(taxonomy_items::user_id.eq(owner.as_uuid()))
            .filter(taxonomy_items::kind.eq(kind.as_str()))
            .select(TaxonomyItemRow::as_select())
            .first::<TaxonomyItemRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_taxonomy_error(&err))?;

        row.map(row_to_item).transpose()
    }

    async fn find_many(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        ids: &BTreeSet<TaxonomyItemId>,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let wanted: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let rows: Vec<TaxonomyItemRow> = taxonomy_items::table
            .filter(taxonomy_items::id.eq_any(&wanted))
            .filter(taxonomy_items::user_id.eq(owner.as_uuid()))
            .filter(taxonomy_items::kind.eq(kind.as_str()))
            .order(taxonomy_items::id.asc())
            .select(TaxonomyItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_taxonomy_error(&err))?;

        rows_to_items(rows)
    }

    async fn insert(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        name: &TaxonomyName,
    ) -> Result<TaxonomyItem, TaxonomyRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let row = NewTaxonomyItemRow {
            user_id: *owner.as_uuid(),
            kind: kind.as_str(),
            name: name.as_ref(),
        };

        let stored = diesel::insert_into(taxonomy_items::table)
            .values(&row)
            .returning(TaxonomyItemRow::as_returning())
            .get_result::<TaxonomyItemRow>(&mut conn)
            .await
            .map_err(|err| map_taxonomy_error(&err))?;

        row_to_item(stored)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
        name: &TaxonomyName,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let target = taxonomy_items::table
            .filter(taxonomy_items::id.eq(id.value()))
            .filter(taxonomy_items::user_id.eq(owner.as_uuid()))
            .filter(taxonomy_items::kind.eq(kind.as_str()));

        let stored = diesel::update(target)
            .set(taxonomy_items::name.eq(name.as_ref()))
            .returning(TaxonomyItemRow::as_returning())
            .get_result::<TaxonomyItemRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_taxonomy_error(&err))?;

        stored.map(row_to_item).transpose()
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<bool, TaxonomyRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TaxonomyRepositoryError::connection))?;

        let target = taxonomy_items::table
            .filter(taxonomy_items::id.eq(id.value()))
            .filter(taxonomy_items::user_id.eq(owner.as_uuid()))
            .filter(taxonomy_items::kind.eq(kind.as_str()));

        let removed = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(|err| map_taxonomy_error(&err))?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn row(kind: &str, name: &str) -> TaxonomyItemRow {
        TaxonomyItemRow {
            id: 7,
            user_id: Uuid::new_v4(),
            kind: kind.to_owned(),
            name: name.to_owned(),
        }
    }

    #[rstest]
    #[case("tag", TaxonomyKind::Tag)]
    #[case("ingredient", TaxonomyKind::Ingredient)]
    fn stored_kinds_are_recognised(#[case] stored: &str, #[case] expected: TaxonomyKind) {
        let item = row_to_item(row(stored, "Vegan")).expect("valid row");
        assert_eq!(item.kind(), expected);
        assert_eq!(item.id(), TaxonomyItemId::new(7));
    }

    #[rstest]
    fn unknown_kind_is_a_query_error() {
        let error = row_to_item(row("utensil", "Whisk")).expect_err("unknown kind");
        assert!(matches!(error, TaxonomyRepositoryError::Query { .. }));
        assert!(error.to_string().contains("stored kind"));
    }
}
