//! PostgreSQL-backed `RecipeRepository` implementation.
//!
//! Recipe rows and their tag/ingredient links are written in one
//! transaction. Referenced ids are checked against the owner's items of the
//! matching kind inside that transaction, so a failed check leaves nothing
//! behind.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::listing::filter_recipes;
use crate::domain::ports::{ImageReplacement, RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    Price, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId, RecipeLink, RecipeTitle,
    StoredImage, TaxonomyItemId, TaxonomyKind, TimeMinutes, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewRecipeRow, RecipeRow, RecipeTaxonomyLinkRow, RecipeUpdate};
use super::pool::DbPool;
use super::schema::{recipe_taxonomy_items, recipes, taxonomy_items};

const KINDS: [TaxonomyKind; 2] = [TaxonomyKind::Tag, TaxonomyKind::Ingredient];

/// Diesel-backed implementation of the recipe repository port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a recipe transaction.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Unowned { kind: TaxonomyKind, ids: Vec<i64> },
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_recipe_error(error: &diesel::result::Error) -> RecipeRepositoryError {
    map_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

fn map_tx_error(error: TxError) -> RecipeRepositoryError {
    match error {
        TxError::Diesel(error) => map_recipe_error(&error),
        TxError::Unowned { kind, ids } => RecipeRepositoryError::unowned_reference(kind, ids),
    }
}

#[derive(Debug, Default)]
struct Links {
    tags: BTreeSet<TaxonomyItemId>,
    ingredients: BTreeSet<TaxonomyItemId>,
}

impl Links {
    fn insert(&mut self, kind: TaxonomyKind, id: TaxonomyItemId) {
        match kind {
            TaxonomyKind::Tag => self.tags.insert(id),
            TaxonomyKind::Ingredient => self.ingredients.insert(id),
        };
    }
}

/// Convert a stored row plus its links into a validated domain recipe.
fn row_to_recipe(row: RecipeRow, links: Links) -> Result<Recipe, RecipeRepositoryError> {
    let RecipeRow {
        id,
        user_id,
        title,
        time_minutes,
        price_cents,
        link,
        image,
    } = row;

    let invalid = |field: &str, err: &dyn std::fmt::Display| {
        RecipeRepositoryError::query(format!("stored {field}: {err}"))
    };
    let draft = RecipeDraft {
        title: RecipeTitle::new(&title).map_err(|err| invalid("title", &err))?,
        time_minutes: TimeMinutes::new(i64::from(time_minutes))
            .map_err(|err| invalid("time_minutes", &err))?,
        price: Price::from_cents(price_cents).map_err(|err| invalid("price", &err))?,
        link: link
            .as_deref()
            .map(RecipeLink::parse)
            .transpose()
            .map_err(|err| invalid("link", &err))?
            .flatten(),
        tags: links.tags,
        ingredients: links.ingredients,
    };
    let image = image
        .map(StoredImage::from_path)
        .transpose()
        .map_err(|err| invalid("image", &err))?;

    Ok(Recipe::new(RecipeId::new(id), UserId::from_uuid(user_id), draft).with_image(image))
}

/// Load tag and ingredient links for the given recipes.
async fn load_links(
    conn: &mut AsyncPgConnection,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, Links>, diesel::result::Error> {
    let mut links: HashMap<i64, Links> = HashMap::new();
    if recipe_ids.is_empty() {
        return Ok(links);
    }

    let rows: Vec<(i64, i64, String)> = recipe_taxonomy_items::table
        .inner_join(taxonomy_items::table)
        .filter(recipe_taxonomy_items::recipe_id.eq_any(recipe_ids))
        .select((
            recipe_taxonomy_items::recipe_id,
            recipe_taxonomy_items::item_id,
            taxonomy_items::kind,
        ))
        .load(conn)
        .await?;

    for (recipe_id, item_id, kind) in rows {
        // The CHECK constraint on `kind` makes other values unreachable.
        if let Ok(kind) = kind.parse::<TaxonomyKind>() {
            links
                .entry(recipe_id)
                .or_default()
                .insert(kind, TaxonomyItemId::new(item_id));
        }
    }
    Ok(links)
}

async fn load_recipe(
    conn: &mut AsyncPgConnection,
    owner: &UserId,
    id: RecipeId,
) -> Result<Option<RecipeRow>, diesel::result::Error> {
    recipes::table
        .filter(recipes::id.eq(id.value()))
        .filter(recipes::user_id.eq(owner.as_uuid()))
        .select(RecipeRow::as_select())
        .first::<RecipeRow>(conn)
        .await
        .optional()
}

/// Reject ids that are not `owner`'s items of `kind`.
async fn ensure_owned(
    conn: &mut AsyncPgConnection,
    owner: &Uuid,
    kind: TaxonomyKind,
    ids: &BTreeSet<TaxonomyItemId>,
) -> Result<(), TxError> {
    if ids.is_empty() {
        return Ok(());
    }
    let wanted: Vec<i64> = ids.iter().map(|id| id.value()).collect();
    let found: BTreeSet<i64> = taxonomy_items::table
        .filter(taxonomy_items::id.eq_any(&wanted))
        .filter(taxonomy_items::user_id.eq(owner))
        .filter(taxonomy_items::kind.eq(kind.as_str()))
        .select(taxonomy_items::id)
        .load::<i64>(conn)
        .await?
        .into_iter()
        .collect();

    let missing: Vec<i64> = wanted
        .into_iter()
        .filter(|id| !found.contains(id))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TxError::Unowned { kind, ids: missing })
    }
}

/// Replace the recipe's links of one kind with `ids`.
async fn replace_links(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    kind: TaxonomyKind,
    ids: &BTreeSet<TaxonomyItemId>,
) -> Result<(), diesel::result::Error> {
    let current: Vec<i64> = recipe_taxonomy_items::table
        .inner_join(taxonomy_items::table)
        .filter(recipe_taxonomy_items::recipe_id.eq(recipe_id))
        .filter(taxonomy_items::kind.eq(kind.as_str()))
        .select(recipe_taxonomy_items::item_id)
        .load(conn)
        .await?;

    if !current.is_empty() {
        diesel::delete(
            recipe_taxonomy_items::table
                .filter(recipe_taxonomy_items::recipe_id.eq(recipe_id))
                .filter(recipe_taxonomy_items::item_id.eq_any(&current)),
        )
        .execute(conn)
        .await?;
    }

    if ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<RecipeTaxonomyLinkRow> = ids
        .iter()
        .map(|id| RecipeTaxonomyLinkRow {
            recipe_id,
            item_id: id.value(),
        })
        .collect();
    diesel::insert_into(recipe_taxonomy_items::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

fn recipe_update(changes: &RecipeChanges) -> RecipeUpdate<'_> {
    RecipeUpdate {
        title: changes.title.as_ref().map(AsRef::as_ref),
        time_minutes: changes.time_minutes.map(TimeMinutes::value),
        price_cents: changes.price.map(Price::cents),
        link: changes
            .link
            .as_ref()
            .map(|link| link.as_ref().map(AsRef::as_ref)),
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::user_id.eq(owner.as_uuid()))
            .order(recipes::id.asc())
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_recipe_error(&err))?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut links = load_links(&mut conn, &ids)
            .await
            .map_err(|err| map_recipe_error(&err))?;

        let recipes = rows
            .into_iter()
            .map(|row| {
                let row_links = links.remove(&row.id).unwrap_or_default();
                row_to_recipe(row, row_links)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filter_recipes(recipes, filter))
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let Some(row) = load_recipe(&mut conn, owner, id)
            .await
            .map_err(|err| map_recipe_error(&err))?
        else {
            return Ok(None);
        };
        let mut links = load_links(&mut conn, &[row.id])
            .await
            .map_err(|err| map_recipe_error(&err))?;
        let row_links = links.remove(&row.id).unwrap_or_default();

        row_to_recipe(row, row_links).map(Some)
    }

    async fn insert(
        &self,
        owner: &UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let owner_uuid = *owner.as_uuid();
        let new_row = NewRecipeRow {
            user_id: owner_uuid,
            title: draft.title.as_ref(),
            time_minutes: draft.time_minutes.value(),
            price_cents: draft.price.cents(),
            link: draft.link.as_ref().map(AsRef::as_ref),
        };

        let recipe_id = conn
            .transaction(|conn| {
                async move {
                    for kind in KINDS {
                        ensure_owned(conn, &owner_uuid, kind, draft.ids(kind)).await?;
                    }

                    let recipe_id = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(recipes::id)
                        .get_result::<i64>(conn)
                        .await?;

                    for kind in KINDS {
                        replace_links(conn, recipe_id, kind, draft.ids(kind)).await?;
                    }
                    Ok::<_, TxError>(recipe_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(Recipe::new(RecipeId::new(recipe_id), *owner, draft.clone()))
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let owner_uuid = *owner.as_uuid();
        let update_row = recipe_update(changes);

        let updated = conn
            .transaction(|conn| {
                async move {
                    let Some(row) = load_recipe(conn, owner, id).await? else {
                        return Ok::<_, TxError>(None);
                    };
                    for kind in KINDS {
                        if let Some(ids) = changes.ids(kind) {
                            ensure_owned(conn, &owner_uuid, kind, ids).await?;
                        }
                    }

                    let row = if changes.has_scalar_changes() {
                        diesel::update(recipes::table.filter(recipes::id.eq(row.id)))
                            .set(&update_row)
                            .returning(RecipeRow::as_returning())
                            .get_result::<RecipeRow>(conn)
                            .await?
                    } else {
                        row
                    };

                    for kind in KINDS {
                        if let Some(ids) = changes.ids(kind) {
                            replace_links(conn, row.id, kind, ids).await?;
                        }
                    }

                    let mut links = load_links(conn, &[row.id]).await?;
                    let row_links = links.remove(&row.id).unwrap_or_default();
                    Ok(Some((row, row_links)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        updated
            .map(|(row, links)| row_to_recipe(row, links))
            .transpose()
    }

    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &StoredImage,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let replaced = conn
            .transaction(|conn| {
                async move {
                    let Some(previous) = load_recipe(conn, owner, id).await? else {
                        return Ok::<_, TxError>(None);
                    };
                    let row = diesel::update(recipes::table.filter(recipes::id.eq(previous.id)))
                        .set(recipes::image.eq(image.as_ref()))
                        .returning(RecipeRow::as_returning())
                        .get_result::<RecipeRow>(conn)
                        .await?;
                    let mut links = load_links(conn, &[row.id]).await?;
                    let row_links = links.remove(&row.id).unwrap_or_default();
                    Ok(Some((row, row_links, previous.image)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        let Some((row, links, previous)) = replaced else {
            return Ok(None);
        };
        let recipe = row_to_recipe(row, links)?;
        // A corrupt previous path is left alone rather than failing the upload.
        let previous = previous.and_then(|path| StoredImage::from_path(path).ok());
        Ok(Some(ImageReplacement { recipe, previous }))
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipeRepositoryError::connection))?;

        let removed = conn
            .transaction(|conn| {
                async move {
                    let Some(row) = load_recipe(conn, owner, id).await? else {
                        return Ok::<_, TxError>(None);
                    };
                    let mut links = load_links(conn, &[row.id]).await?;
                    let row_links = links.remove(&row.id).unwrap_or_default();
                    diesel::delete(recipes::table.filter(recipes::id.eq(row.id)))
                        .execute(conn)
                        .await?;
                    Ok(Some((row, row_links)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        removed
            .map(|(row, links)| row_to_recipe(row, links))
            .transpose()
    }
}
