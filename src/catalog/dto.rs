use serde::{Deserialize, Serialize};

use crate::catalog::repo::{Ingredient, PublicRecipe};
use crate::catalog::search::DEFAULT_PAGE_SIZE;

/// One slice of a ranked result set. `page` is 1-indexed.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct IngredientBody {
    pub name: String,
    pub quantity: String,
}

/// Request body for adding a catalog entry.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub portions: i64,
    pub cook_time: String,
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub instructions: String,
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientBody>,
}

/// Catalog card: the list view does not need instructions or nutrition.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub portions: i64,
    pub cook_time: String,
    pub category: String,
    pub category_label: Option<&'static str>,
    pub likes: i64,
}

impl From<PublicRecipe> for RecipeSummary {
    fn from(r: PublicRecipe) -> Self {
        let category_label = crate::catalog::categories::label(&r.category);
        Self {
            id: r.id,
            name: r.name,
            portions: r.portions,
            cook_time: r.cook_time,
            category: r.category,
            category_label,
            likes: r.likes,
        }
    }
}

/// Full recipe view with its ingredient list.
#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: PublicRecipe,
    pub category_label: Option<&'static str>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub likes: i64,
}
