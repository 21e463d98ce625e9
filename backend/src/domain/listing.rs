//! Ordering and filtering rules shared by every storage adapter.
//!
//! Adapters return owner-scoped rows; these functions turn them into the
//! result sets the API promises. Names and titles compare byte-wise, so
//! ordering is case-sensitive and identical across adapters. Ties fall back
//! to ascending identifier.

use std::collections::BTreeSet;

use super::{Recipe, RecipeFilter, TaxonomyItem, TaxonomyItemId, TaxonomyKind};

/// Sort items by name, descending.
pub fn sort_items_by_name_desc(items: &mut [TaxonomyItem]) {
    items.sort_by(|a, b| {
        b.name()
            .as_ref()
            .cmp(a.name().as_ref())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Sort recipes by title, descending.
pub fn sort_recipes_by_title_desc(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| {
        b.title()
            .as_ref()
            .cmp(a.title().as_ref())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Identifiers of `kind` referenced by at least one of `recipes`.
#[must_use]
pub fn assigned_ids(kind: TaxonomyKind, recipes: &[Recipe]) -> BTreeSet<TaxonomyItemId> {
    recipes
        .iter()
        .flat_map(|recipe| recipe.ids(kind).iter().copied())
        .collect()
}

/// Keep only items referenced by some recipe. Each item appears once.
#[must_use]
pub fn retain_assigned(items: Vec<TaxonomyItem>, recipes: &[Recipe]) -> Vec<TaxonomyItem> {
    let tags = assigned_ids(TaxonomyKind::Tag, recipes);
    let ingredients = assigned_ids(TaxonomyKind::Ingredient, recipes);
    items
        .into_iter()
        .filter(|item| match item.kind() {
            TaxonomyKind::Tag => tags.contains(&item.id()),
            TaxonomyKind::Ingredient => ingredients.contains(&item.id()),
        })
        .collect()
}

/// Whether `recipe` satisfies `filter`.
///
/// Each non-empty set requires at least one shared identifier; the two sets
/// combine with logical AND.
#[must_use]
pub fn matches_filter(recipe: &Recipe, filter: &RecipeFilter) -> bool {
    [TaxonomyKind::Tag, TaxonomyKind::Ingredient]
        .into_iter()
        .all(|kind| {
            let wanted = filter.ids(kind);
            wanted.is_empty() || !wanted.is_disjoint(recipe.ids(kind))
        })
}

/// Apply `filter` to owner-scoped recipes. Input identifiers are unique, so
/// the output is free of duplicates.
#[must_use]
pub fn filter_recipes(recipes: Vec<Recipe>, filter: &RecipeFilter) -> Vec<Recipe> {
    recipes
        .into_iter()
        .filter(|recipe| matches_filter(recipe, filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Price, RecipeDraft, RecipeId, RecipeTitle, TaxonomyName, TimeMinutes, UserId,
    };
    use rstest::{fixture, rstest};

    fn ids(values: &[i64]) -> BTreeSet<TaxonomyItemId> {
        values.iter().copied().map(TaxonomyItemId::new).collect()
    }

    fn item(id: i64, kind: TaxonomyKind, name: &str) -> TaxonomyItem {
        TaxonomyItem::new(
            TaxonomyItemId::new(id),
            UserId::from_uuid(uuid::Uuid::nil()),
            kind,
            TaxonomyName::new(name).expect("valid name"),
        )
    }

    fn recipe(id: i64, title: &str, tags: &[i64], ingredients: &[i64]) -> Recipe {
        Recipe::new(
            RecipeId::new(id),
            UserId::from_uuid(uuid::Uuid::nil()),
            RecipeDraft {
                title: RecipeTitle::new(title).expect("valid title"),
                time_minutes: TimeMinutes::new(5).expect("valid time"),
                price: Price::from_cents(500).expect("valid price"),
                link: None,
                tags: ids(tags),
                ingredients: ids(ingredients),
            },
        )
    }

    #[fixture]
    fn recipes() -> Vec<Recipe> {
        vec![
            recipe(1, "Thai curry", &[10], &[20, 21]),
            recipe(2, "Tahini toast", &[11], &[21]),
            recipe(3, "Fish and chips", &[], &[22]),
        ]
    }

    #[rstest]
    fn names_sort_descending_byte_wise() {
        let mut items = vec![
            item(1, TaxonomyKind::Tag, "Breakfast"),
            item(2, TaxonomyKind::Tag, "vegan"),
            item(3, TaxonomyKind::Tag, "Dessert"),
            item(4, TaxonomyKind::Tag, "apple"),
        ];
        sort_items_by_name_desc(&mut items);
        let names: Vec<&str> = items.iter().map(|i| i.name().as_ref()).collect();
        assert_eq!(names, ["vegan", "apple", "Dessert", "Breakfast"]);
    }

    #[rstest]
    fn equal_names_keep_ascending_id_order() {
        let mut items = vec![
            item(7, TaxonomyKind::Tag, "Same"),
            item(3, TaxonomyKind::Tag, "Same"),
            item(5, TaxonomyKind::Tag, "Other"),
        ];
        sort_items_by_name_desc(&mut items);
        let order: Vec<i64> = items.iter().map(|i| i.id().value()).collect();
        assert_eq!(order, [3, 7, 5]);
    }

    #[rstest]
    fn titles_sort_descending(recipes: Vec<Recipe>) {
        let mut recipes = recipes;
        sort_recipes_by_title_desc(&mut recipes);
        let titles: Vec<&str> = recipes.iter().map(|r| r.title().as_ref()).collect();
        assert_eq!(titles, ["Thai curry", "Tahini toast", "Fish and chips"]);
    }

    #[rstest]
    fn assigned_items_appear_once(recipes: Vec<Recipe>) {
        let items = vec![
            item(20, TaxonomyKind::Ingredient, "Coconut"),
            item(21, TaxonomyKind::Ingredient, "Sesame"),
            item(23, TaxonomyKind::Ingredient, "Unused"),
        ];
        let kept = retain_assigned(items, &recipes);
        let kept_ids: Vec<i64> = kept.iter().map(|i| i.id().value()).collect();
        assert_eq!(kept_ids, [20, 21]);
    }

    #[rstest]
    fn assignment_is_checked_per_kind(recipes: Vec<Recipe>) {
        // Id 20 is referenced as an ingredient, never as a tag.
        let items = vec![item(20, TaxonomyKind::Tag, "Clash")];
        assert!(retain_assigned(items, &recipes).is_empty());
    }

    #[rstest]
    #[case(&[], &[], &[1, 2, 3])]
    #[case(&[10, 11], &[], &[1, 2])]
    #[case(&[], &[22], &[3])]
    #[case(&[10, 11], &[21], &[1, 2])]
    #[case(&[10], &[22], &[])]
    #[case(&[99], &[], &[])]
    fn filters_combine_any_within_and_across(
        recipes: Vec<Recipe>,
        #[case] tags: &[i64],
        #[case] ingredients: &[i64],
        #[case] expected: &[i64],
    ) {
        let filter = RecipeFilter {
            tags: ids(tags),
            ingredients: ids(ingredients),
        };
        let matched: Vec<i64> = filter_recipes(recipes, &filter)
            .iter()
            .map(|r| r.id().value())
            .collect();
        assert_eq!(matched, expected);
    }
}
