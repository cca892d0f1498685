use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::session::AuthUser;
use crate::catalog::dto::{
    BrowseParams, CreateRecipeRequest, LikeResponse, Page, RecipeDetails, RecipeSummary,
    SearchParams,
};
use crate::catalog::repo::{NewPublicRecipe, PublicRecipe};
use crate::catalog::{categories, likes, search};
use crate::error::AppError;
use crate::state::AppState;

pub fn browse_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/:category", get(browse_category))
        .route("/catalog/:category/search", get(search_category))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route("/recipes/:id", get(get_recipe).delete(delete_recipe))
        .route("/recipes/:id/like", post(like_recipe))
        .route("/likes", get(list_liked))
}

#[instrument(skip(state))]
pub async fn browse_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(p): Query<BrowseParams>,
) -> Result<Json<Page<RecipeSummary>>, AppError> {
    let page = search::browse(&state.db, &category, p.page, p.per_page).await?;
    Ok(Json(Page {
        items: page.items.into_iter().map(RecipeSummary::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

#[instrument(skip(state, p), fields(q = %p.q))]
pub async fn search_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(p): Query<SearchParams>,
) -> Result<Json<Page<RecipeSummary>>, AppError> {
    let page = search::search(&state.db, &category, &p.q, p.page, p.per_page).await?;
    Ok(Json(Page {
        items: page.items.into_iter().map(RecipeSummary::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<PublicRecipe>), AppError> {
    if !categories::is_known(&body.category) {
        return Err(AppError::UnknownCategory(body.category.clone()));
    }
    let ingredients: Vec<(&str, &str)> = body
        .ingredients
        .iter()
        .map(|i| (i.name.as_str(), i.quantity.as_str()))
        .collect();
    let recipe = PublicRecipe::create(
        &state.db,
        NewPublicRecipe {
            name: &body.name,
            portions: body.portions,
            cook_time: &body.cook_time,
            calories: &body.calories,
            protein: &body.protein,
            fat: &body.fat,
            carbs: &body.carbs,
            instructions: &body.instructions,
            category: &body.category,
        },
        &ingredients,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !PublicRecipe::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetails>, AppError> {
    let recipe = PublicRecipe::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let ingredients = PublicRecipe::ingredients(&state.db, id).await?;
    let category_label = categories::label(&recipe.category);
    Ok(Json(RecipeDetails {
        recipe,
        category_label,
        ingredients,
    }))
}

#[instrument(skip(state))]
pub async fn like_recipe(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>, AppError> {
    let likes = likes::like_recipe(&state.db, current.id, id).await?;
    Ok(Json(LikeResponse { likes }))
}

#[instrument(skip(state))]
pub async fn list_liked(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let recipes = likes::likes_for_user(&state.db, current.id).await?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}
