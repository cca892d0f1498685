use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::auth::session::AuthUser;
use crate::error::AppError;
use crate::menu::dto::PersonalRecipeBody;
use crate::menu::repo::{PersonalRecipe, PersonalRecipeFields};
use crate::state::AppState;

pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(create_recipe))
        .route(
            "/menu/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state))]
pub async fn list_menu(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Vec<PersonalRecipe>>, AppError> {
    let recipes = PersonalRecipe::list_by_owner(&state.db, &current.pseudonym).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(body): Json<PersonalRecipeBody>,
) -> Result<(StatusCode, Json<PersonalRecipe>), AppError> {
    let recipe = PersonalRecipe::create(
        &state.db,
        &current.pseudonym,
        PersonalRecipeFields {
            name: &body.name,
            ingredients: &body.ingredients,
            description: &body.description,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PersonalRecipe>, AppError> {
    let recipe = PersonalRecipe::get_owned(&state.db, id, &current.pseudonym).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<PersonalRecipeBody>,
) -> Result<Json<PersonalRecipe>, AppError> {
    let recipe = PersonalRecipe::update_owned(
        &state.db,
        id,
        &current.pseudonym,
        PersonalRecipeFields {
            name: &body.name,
            ingredients: &body.ingredients,
            description: &body.description,
        },
    )
    .await?;
    Ok(Json(recipe))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    PersonalRecipe::delete_owned(&state.db, id, &current.pseudonym).await?;
    Ok(StatusCode::NO_CONTENT)
}
