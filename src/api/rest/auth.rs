use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, NewAdmin, NewCourier, NewCustomer, UserSummary};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth", post(create_auth_token))
        .route("/registration/courier", post(register_courier))
        .route("/registration/customer", post(register_customer))
        .route("/registration/admin", post(register_admin))
}

#[derive(Deserialize)]
struct AuthRequest {
    phone_number: String,
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
}

async fn create_auth_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = accounts::login(&state, &payload.phone_number, &payload.password).await?;
    Ok(Json(AuthResponse { token }))
}

async fn register_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCourier>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = accounts::register_courier(&state, payload).await?;
    Ok(Json(summary))
}

async fn register_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCustomer>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = accounts::register_customer(&state, payload).await?;
    Ok(Json(summary))
}

async fn register_admin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewAdmin>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = accounts::register_admin(&state, payload).await?;
    Ok(Json(summary))
}
