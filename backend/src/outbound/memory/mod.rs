//! Single-lock in-memory store implementing every repository port.
//!
//! Used when no database URL is configured and by the HTTP tests. All state
//! sits behind one mutex, so each repository call observes and mutates a
//! consistent snapshot, matching the transactional guarantees of the Diesel
//! adapters.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::listing::{filter_recipes, retain_assigned};
use crate::domain::ports::{
    ImageReplacement, RecipeRepository, RecipeRepositoryError, TaxonomyRepository,
    TaxonomyRepositoryError, TokenRepository, TokenRepositoryError, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    EmailAddress, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId, StoredImage,
    TaxonomyItem, TaxonomyItemId, TaxonomyKind, TaxonomyName, TokenDigest, User, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug)]
struct StoreState {
    users: HashMap<UserId, User>,
    tokens: HashMap<String, UserId>,
    items: BTreeMap<i64, TaxonomyItem>,
    recipes: BTreeMap<i64, Recipe>,
    next_item_id: i64,
    next_recipe_id: i64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            tokens: HashMap::new(),
            items: BTreeMap::new(),
            recipes: BTreeMap::new(),
            next_item_id: 1,
            next_recipe_id: 1,
        }
    }
}

fn owned_item<'a>(
    items: &'a BTreeMap<i64, TaxonomyItem>,
    owner: &UserId,
    kind: TaxonomyKind,
    id: i64,
) -> Option<&'a TaxonomyItem> {
    items
        .get(&id)
        .filter(|item| item.owner() == owner && item.kind() == kind)
}

/// Ids among `ids` that are not `owner`'s items of `kind`.
fn unowned(
    items: &BTreeMap<i64, TaxonomyItem>,
    owner: &UserId,
    kind: TaxonomyKind,
    ids: &BTreeSet<TaxonomyItemId>,
) -> Option<RecipeRepositoryError> {
    let missing: Vec<i64> = ids
        .iter()
        .map(|id| id.value())
        .filter(|id| owned_item(items, owner, kind, *id).is_none())
        .collect();
    (!missing.is_empty()).then(|| RecipeRepositoryError::unowned_reference(kind, missing))
}

fn check_references<'a>(
    items: &BTreeMap<i64, TaxonomyItem>,
    owner: &UserId,
    mut sets: impl FnMut(TaxonomyKind) -> Option<&'a BTreeSet<TaxonomyItemId>>,
) -> Result<(), RecipeRepositoryError> {
    for kind in [TaxonomyKind::Tag, TaxonomyKind::Ingredient] {
        if let Some(error) = sets(kind).and_then(|ids| unowned(items, owner, kind, ids)) {
            return Err(error);
        }
    }
    Ok(())
}

impl StoreState {
    fn owned_item(&self, owner: &UserId, kind: TaxonomyKind, id: i64) -> Option<&TaxonomyItem> {
        owned_item(&self.items, owner, kind, id)
    }

    fn owned_item_mut(
        &mut self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: i64,
    ) -> Option<&mut TaxonomyItem> {
        self.items
            .get_mut(&id)
            .filter(|item| item.owner() == owner && item.kind() == kind)
    }

    fn owned_recipe_mut(&mut self, owner: &UserId, id: RecipeId) -> Option<&mut Recipe> {
        self.recipes
            .get_mut(&id.value())
            .filter(|recipe| recipe.owner() == owner)
    }

    fn owner_recipes(&self, owner: &UserId) -> Vec<Recipe> {
        self.recipes
            .values()
            .filter(|recipe| recipe.owner() == owner)
            .cloned()
            .collect()
    }
}

/// Shared in-memory backing store; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.users.values().any(|known| known.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        match state.users.get_mut(user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query("record not found")),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn store(
        &self,
        digest: &TokenDigest,
        user_id: &UserId,
    ) -> Result<(), TokenRepositoryError> {
        let mut state = self.lock().map_err(TokenRepositoryError::query)?;
        state
            .tokens
            .entry(digest.as_ref().to_owned())
            .or_insert(*user_id);
        Ok(())
    }

    async fn find_user_id(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, TokenRepositoryError> {
        let state = self.lock().map_err(TokenRepositoryError::query)?;
        Ok(state.tokens.get(digest.as_ref()).copied())
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryStore {
    async fn list(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        assigned_only: bool,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError> {
        let state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        let items: Vec<TaxonomyItem> = state
            .items
            .values()
            .filter(|item| item.owner() == owner && item.kind() == kind)
            .cloned()
            .collect();
        if assigned_only {
            Ok(retain_assigned(items, &state.owner_recipes(owner)))
        } else {
            Ok(items)
        }
    }

    async fn find(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError> {
        let state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        Ok(state.owned_item(owner, kind, id.value()).cloned())
    }

    async fn find_many(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        ids: &BTreeSet<TaxonomyItemId>,
    ) -> Result<Vec<TaxonomyItem>, TaxonomyRepositoryError> {
        let state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.owned_item(owner, kind, id.value()).cloned())
            .collect())
    }

    async fn insert(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        name: &TaxonomyName,
    ) -> Result<TaxonomyItem, TaxonomyRepositoryError> {
        let mut state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        let id = state.next_item_id;
        state.next_item_id += 1;
        let item = TaxonomyItem::new(TaxonomyItemId::new(id), *owner, kind, name.clone());
        state.items.insert(id, item.clone());
        Ok(item)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
        name: &TaxonomyName,
    ) -> Result<Option<TaxonomyItem>, TaxonomyRepositoryError> {
        let mut state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        let Some(item) = state.owned_item_mut(owner, kind, id.value()) else {
            return Ok(None);
        };
        *item = item.clone().with_name(name.clone());
        Ok(Some(item.clone()))
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: TaxonomyKind,
        id: TaxonomyItemId,
    ) -> Result<bool, TaxonomyRepositoryError> {
        let mut state = self.lock().map_err(TaxonomyRepositoryError::query)?;
        if state.owned_item(owner, kind, id.value()).is_none() {
            return Ok(false);
        }
        state.items.remove(&id.value());
        for recipe in state.recipes.values_mut() {
            recipe.unlink(kind, id);
        }
        Ok(true)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(filter_recipes(state.owner_recipes(owner), filter))
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(state
            .recipes
            .get(&id.value())
            .filter(|recipe| recipe.owner() == owner)
            .cloned())
    }

    async fn insert(
        &self,
        owner: &UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        check_references(&state.items, owner, |kind| Some(draft.ids(kind)))?;

        let id = state.next_recipe_id;
        state.next_recipe_id += 1;
        let recipe = Recipe::new(RecipeId::new(id), *owner, draft.clone());
        state.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        let StoreState { items, recipes, .. } = &mut *state;
        let Some(recipe) = recipes
            .get_mut(&id.value())
            .filter(|recipe| recipe.owner() == owner)
        else {
            return Ok(None);
        };
        check_references(items, owner, |kind| changes.ids(kind))?;

        *recipe = recipe.clone().apply(changes);
        Ok(Some(recipe.clone()))
    }

    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &StoredImage,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        let Some(recipe) = state.owned_recipe_mut(owner, id) else {
            return Ok(None);
        };
        let previous = recipe.image().cloned();
        *recipe = recipe.clone().with_image(Some(image.clone()));
        Ok(Some(ImageReplacement {
            recipe: recipe.clone(),
            previous,
        }))
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        if state.owned_recipe_mut(owner, id).is_none() {
            return Ok(None);
        }
        Ok(state.recipes.remove(&id.value()))
    }
}

#[cfg(test)]
mod tests;
