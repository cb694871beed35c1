use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::Json;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::accounts::{self, CourierProfile, CustomerProfile};
use crate::auth::Principal;
use crate::error::AppError;
use crate::models::courier::Courier;
use crate::models::customer::Customer;
use crate::models::user::Role;
use crate::state::AppState;

/// Admin-only user management: block/unblock/delete users, edit courier and
/// customer profiles by user id, list everyone.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admins/users/:user_id/block", post(block_user))
        .route("/admins/users/:user_id/unblock", post(unblock_user))
        .route("/admins/:user_id", delete(delete_user))
        .route("/admins/couriers", get(get_all_couriers))
        .route("/admins/couriers/:user_id", put(edit_courier))
        .route("/admins/customers", get(get_all_customers))
        .route("/admins/customers/:user_id", put(edit_customer))
}

async fn block_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require(Role::Admin)?;
    accounts::block_user(&state, user_id).await?;
    Ok(Json(json!({
        "message": format!("user with id {user_id} is blocked")
    })))
}

async fn unblock_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require(Role::Admin)?;
    accounts::unblock_user(&state, user_id).await?;
    Ok(Json(json!({
        "message": format!("user with id {user_id} is unblocked")
    })))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require(Role::Admin)?;
    let phone_number = accounts::delete_user(&state, user_id).await?;
    Ok(Json(json!({
        "message": format!("user with phone number {phone_number} is deleted")
    })))
}

async fn edit_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
    Json(profile): Json<CourierProfile>,
) -> Result<Json<Courier>, AppError> {
    principal.require(Role::Admin)?;
    let courier = accounts::edit_courier_profile(&state, user_id, profile).await?;
    Ok(Json(courier))
}

async fn edit_customer(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
    Json(profile): Json<CustomerProfile>,
) -> Result<Json<Customer>, AppError> {
    principal.require(Role::Admin)?;
    let customer = accounts::edit_customer_profile(&state, user_id, profile).await?;
    Ok(Json(customer))
}

async fn get_all_couriers(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<Courier>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(accounts::all_couriers(&state)?))
}

async fn get_all_customers(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<Customer>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(accounts::all_customers(&state)?))
}
