//! Behaviour of the in-memory store across repository ports.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    PasswordDigest, Price, RecipeLink, RecipeTitle, TimeMinutes, UserFlags, UserName,
};

fn user(email: &str) -> User {
    User::new(
        UserId::random(),
        EmailAddress::parse(email).expect("valid email"),
        UserName::default(),
        PasswordDigest::new("digest"),
        UserFlags::regular(),
    )
}

fn name(raw: &str) -> TaxonomyName {
    TaxonomyName::new(raw).expect("valid name")
}

fn ids(values: &[i64]) -> BTreeSet<TaxonomyItemId> {
    values.iter().copied().map(TaxonomyItemId::new).collect()
}

fn draft(title: &str, tags: &[i64], ingredients: &[i64]) -> RecipeDraft {
    RecipeDraft {
        title: RecipeTitle::new(title).expect("valid title"),
        time_minutes: TimeMinutes::new(10).expect("valid time"),
        price: Price::from_cents(500).expect("valid price"),
        link: RecipeLink::parse("").expect("valid link"),
        tags: ids(tags),
        ingredients: ids(ingredients),
    }
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_are_rejected(store: InMemoryStore) {
    UserRepository::insert(&store, &user("cook@example.com"))
        .await
        .expect("first insert");

    let error = UserRepository::insert(&store, &user("cook@example.com"))
        .await
        .expect_err("duplicate");
    assert_eq!(
        error,
        UserPersistenceError::duplicate_email("cook@example.com")
    );
}

#[rstest]
#[tokio::test]
async fn tokens_resolve_to_their_owner(store: InMemoryStore) {
    let owner = UserId::random();
    let digest = TokenDigest::of("raw-token");
    store.store(&digest, &owner).await.expect("store");

    assert_eq!(store.find_user_id(&digest).await.expect("find"), Some(owner));
    assert_eq!(
        store
            .find_user_id(&TokenDigest::of("other"))
            .await
            .expect("find"),
        None
    );
}

#[rstest]
#[tokio::test]
async fn items_are_scoped_by_owner_and_kind(store: InMemoryStore) {
    let owner = UserId::random();
    let stranger = UserId::random();
    let tag = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Vegan"))
        .await
        .expect("insert");

    let as_ingredient = TaxonomyRepository::find(&store, &owner, TaxonomyKind::Ingredient, tag.id())
        .await
        .expect("find");
    let as_stranger = TaxonomyRepository::find(&store, &stranger, TaxonomyKind::Tag, tag.id())
        .await
        .expect("find");

    assert!(as_ingredient.is_none());
    assert!(as_stranger.is_none());
}

#[rstest]
#[tokio::test]
async fn recipes_reject_references_of_the_wrong_kind(store: InMemoryStore) {
    let owner = UserId::random();
    let tag = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Vegan"))
        .await
        .expect("insert");

    let error = RecipeRepository::insert(&store, &owner, &draft("Soup", &[], &[tag.id().value()]))
        .await
        .expect_err("tag used as ingredient");

    assert_eq!(
        error,
        RecipeRepositoryError::unowned_reference(TaxonomyKind::Ingredient, vec![tag.id().value()])
    );
    let listed = RecipeRepository::list(&store, &owner, &RecipeFilter::default())
        .await
        .expect("list");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_an_item_unlinks_it_and_updates_assignment(store: InMemoryStore) {
    let owner = UserId::random();
    let vegan = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Vegan"))
        .await
        .expect("insert");
    let spicy = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Spicy"))
        .await
        .expect("insert");
    let recipe = RecipeRepository::insert(
        &store,
        &owner,
        &draft("Curry", &[vegan.id().value(), spicy.id().value()], &[]),
    )
    .await
    .expect("insert recipe");

    let assigned = TaxonomyRepository::list(&store, &owner, TaxonomyKind::Tag, true)
        .await
        .expect("list");
    assert_eq!(assigned.len(), 2);

    assert!(
        TaxonomyRepository::delete(&store, &owner, TaxonomyKind::Tag, vegan.id())
            .await
            .expect("delete")
    );

    let stored = RecipeRepository::find(&store, &owner, recipe.id())
        .await
        .expect("find")
        .expect("recipe exists");
    assert_eq!(stored.tags(), &ids(&[spicy.id().value()]));
}

#[rstest]
#[tokio::test]
async fn replacing_an_image_reports_the_previous_one(store: InMemoryStore) {
    let owner = UserId::random();
    let recipe = RecipeRepository::insert(&store, &owner, &draft("Bread", &[], &[]))
        .await
        .expect("insert");
    let first = StoredImage::from_path("uploads/recipe/a.png").expect("path");
    let second = StoredImage::from_path("uploads/recipe/b.png").expect("path");

    let initial = store
        .replace_image(&owner, recipe.id(), &first)
        .await
        .expect("replace")
        .expect("owned");
    assert_eq!(initial.previous, None);

    let replaced = store
        .replace_image(&owner, recipe.id(), &second)
        .await
        .expect("replace")
        .expect("owned");
    assert_eq!(replaced.previous, Some(first));
    assert_eq!(replaced.recipe.image(), Some(&second));

    let stranger = store
        .replace_image(&UserId::random(), recipe.id(), &second)
        .await
        .expect("replace");
    assert!(stranger.is_none());
}

#[rstest]
#[tokio::test]
async fn partial_updates_replace_only_given_reference_sets(store: InMemoryStore) {
    let owner = UserId::random();
    let tag = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Quick"))
        .await
        .expect("insert");
    let salt = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Ingredient, &name("Salt"))
        .await
        .expect("insert");
    let recipe = RecipeRepository::insert(&store, &owner, &draft("Eggs", &[], &[salt.id().value()]))
        .await
        .expect("insert");

    let changes = RecipeChanges {
        tags: Some(ids(&[tag.id().value()])),
        ..RecipeChanges::default()
    };
    let updated = RecipeRepository::update(&store, &owner, recipe.id(), &changes)
        .await
        .expect("update")
        .expect("owned");

    assert_eq!(updated.tags(), &ids(&[tag.id().value()]));
    assert_eq!(updated.ingredients(), &ids(&[salt.id().value()]));
    assert_eq!(updated.title().as_ref(), "Eggs");
}

#[rstest]
#[tokio::test]
async fn renaming_touches_only_the_owners_item_of_that_kind(store: InMemoryStore) {
    let owner = UserId::random();
    let tag = TaxonomyRepository::insert(&store, &owner, TaxonomyKind::Tag, &name("Vegan"))
        .await
        .expect("insert");

    let wrong_kind = store
        .rename(&owner, TaxonomyKind::Ingredient, tag.id(), &name("Tofu"))
        .await
        .expect("rename");
    let stranger = store
        .rename(&UserId::random(), TaxonomyKind::Tag, tag.id(), &name("Meat"))
        .await
        .expect("rename");
    let renamed = store
        .rename(&owner, TaxonomyKind::Tag, tag.id(), &name("Plant based"))
        .await
        .expect("rename")
        .expect("owned");

    assert!(wrong_kind.is_none());
    assert!(stranger.is_none());
    assert_eq!(renamed.id(), tag.id());
    assert_eq!(renamed.name().as_ref(), "Plant based");
    let stored = TaxonomyRepository::find(&store, &owner, TaxonomyKind::Tag, tag.id())
        .await
        .expect("find");
    assert_eq!(stored, Some(renamed));
}

#[rstest]
#[tokio::test]
async fn rejected_updates_leave_the_stored_recipe_intact(store: InMemoryStore) {
    let owner = UserId::random();
    let recipe = RecipeRepository::insert(&store, &owner, &draft("Eggs", &[], &[]))
        .await
        .expect("insert");
    let changes = RecipeChanges {
        title: Some(RecipeTitle::new("Omelette").expect("valid title")),
        tags: Some(ids(&[404])),
        ..RecipeChanges::default()
    };

    let error = RecipeRepository::update(&store, &owner, recipe.id(), &changes)
        .await
        .expect_err("unknown tag");
    let foreign = RecipeRepository::update(&store, &UserId::random(), recipe.id(), &changes)
        .await
        .expect("foreign update");

    assert_eq!(
        error,
        RecipeRepositoryError::unowned_reference(TaxonomyKind::Tag, vec![404])
    );
    assert!(foreign.is_none());
    let stored = RecipeRepository::find(&store, &owner, recipe.id())
        .await
        .expect("find");
    assert_eq!(stored, Some(recipe));
}
