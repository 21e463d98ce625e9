//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is stored lowercased and is unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Varchar,
        /// PHC-encoded argon2 digest.
        password_hash -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of issued API tokens.
    auth_tokens (digest) {
        digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tags and ingredients, discriminated by `kind`.
    taxonomy_items (id) {
        id -> Int8,
        user_id -> Uuid,
        /// Either `tag` or `ingredient`.
        kind -> Varchar,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        user_id -> Uuid,
        title -> Varchar,
        time_minutes -> Int4,
        /// Price in cents, `0..=99999`.
        price_cents -> Int8,
        link -> Nullable<Varchar>,
        /// Image path relative to the media root.
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Links between recipes and the tags and ingredients they reference.
    recipe_taxonomy_items (recipe_id, item_id) {
        recipe_id -> Int8,
        item_id -> Int8,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(taxonomy_items -> users (user_id));
diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(recipe_taxonomy_items -> recipes (recipe_id));
diesel::joinable!(recipe_taxonomy_items -> taxonomy_items (item_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    taxonomy_items,
    recipes,
    recipe_taxonomy_items,
);
