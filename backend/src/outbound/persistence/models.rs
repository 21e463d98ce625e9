//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversion into domain
//! types happens in the repositories, where stored values are revalidated.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{auth_tokens, recipe_taxonomy_items, recipes, taxonomy_items, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Mutable account columns. The email never changes after registration.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub digest: &'a str,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Taxonomy models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = taxonomy_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaxonomyItemRow {
    pub id: i64,
    pub user_id: Uuid,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = taxonomy_items)]
pub(crate) struct NewTaxonomyItemRow<'a> {
    pub user_id: Uuid,
    pub kind: &'a str,
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// Recipe models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price_cents: i64,
    pub link: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price_cents: i64,
    pub link: Option<&'a str>,
}

/// Partial recipe update. `None` skips a column; `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeUpdate<'a> {
    pub title: Option<&'a str>,
    pub time_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub link: Option<Option<&'a str>>,
}

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = recipe_taxonomy_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeTaxonomyLinkRow {
    pub recipe_id: i64,
    pub item_id: i64,
}
