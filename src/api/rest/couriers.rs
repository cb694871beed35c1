use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::accounts::{self, CourierProfile};
use crate::auth::Principal;
use crate::error::AppError;
use crate::models::courier::Courier;
use crate::models::user::Role;
use crate::state::AppState;

/// Self-service routes for the calling courier.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/couriers", get(get_own_profile).put(edit_own_profile))
}

async fn get_own_profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Courier>, AppError> {
    principal.require(Role::Courier)?;
    Ok(Json(accounts::courier_profile(&state, &principal.phone_number)?))
}

async fn edit_own_profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(profile): Json<CourierProfile>,
) -> Result<Json<Courier>, AppError> {
    principal.require(Role::Courier)?;
    let courier = accounts::edit_courier_profile(&state, principal.user_id, profile).await?;
    Ok(Json(courier))
}
