use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::accounts::{self, CustomerProfile};
use crate::auth::Principal;
use crate::error::AppError;
use crate::models::customer::Customer;
use crate::models::user::Role;
use crate::state::AppState;

/// Self-service routes for the calling customer.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/customers",
        get(get_own_profile)
            .put(edit_own_profile)
            .delete(delete_own_account),
    )
}

async fn get_own_profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Customer>, AppError> {
    principal.require(Role::Customer)?;
    Ok(Json(accounts::customer_profile(&state, &principal.phone_number)?))
}

async fn edit_own_profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(profile): Json<CustomerProfile>,
) -> Result<Json<Customer>, AppError> {
    principal.require(Role::Customer)?;
    let customer = accounts::edit_customer_profile(&state, principal.user_id, profile).await?;
    Ok(Json(customer))
}

async fn delete_own_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Value>, AppError> {
    principal.require(Role::Customer)?;
    let phone_number = accounts::delete_user(&state, principal.user_id).await?;
    Ok(Json(json!({
        "message": format!("user with phone number {phone_number} is deleted")
    })))
}
