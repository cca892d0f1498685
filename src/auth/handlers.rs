use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::service;
use crate::auth::session::{BearerToken, Session};
use crate::error::AppError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = service::register(
        &state.db,
        &payload.email,
        &payload.password,
        &payload.password_confirm,
    )
    .await?;

    // A fresh registration is logged in right away.
    let session = Session::create(&state.db, user.id, state.config.session.ttl_minutes).await?;
    Ok(Json(AuthResponse {
        token: session.token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (session, user) = service::login(
        &state.db,
        &payload.email,
        &payload.password,
        state.config.session.ttl_minutes,
    )
    .await?;
    Ok(Json(AuthResponse {
        token: session.token,
        user: user.into(),
    }))
}

#[instrument(skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<(), AppError> {
    service::logout(&state.db, &token).await
}

#[instrument(skip(state, token))]
pub async fn get_me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<PublicUser>, AppError> {
    let user = service::current_user(&state.db, &token)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user.into()))
}
