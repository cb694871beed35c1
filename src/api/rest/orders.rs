use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts;
use crate::auth::Principal;
use crate::engine::lifecycle::{self, OrderDraft};
use crate::error::AppError;
use crate::models::order::Order;
use crate::models::user::Role;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(get_all_orders).post(create_order))
        .route("/orders/status", get(get_orders_by_status))
        .route("/orders/customers", get(get_own_orders_by_customer))
        .route("/orders/customers/:customer_id", get(get_orders_by_customer))
        .route("/orders/couriers", get(get_own_orders_by_courier))
        .route("/orders/couriers/:courier_id", get(get_orders_by_courier))
        .route(
            "/orders/:order_id",
            get(get_order)
                .put(edit_order_by_customer)
                .delete(delete_order),
        )
        .route("/orders/:order_id/admin", put(edit_order_by_admin))
        .route("/orders/:order_id/cancel", put(cancel_order_by_customer))
        .route("/orders/:order_id/cancel/admin", put(cancel_order_by_admin))
        .route("/orders/:order_id/delivered", put(deliver_order_by_courier))
        .route("/orders/:order_id/delivered/admin", put(deliver_order_by_admin))
        .route("/orders/:order_id/couriers/assign", put(self_assign_courier))
        .route(
            "/orders/:order_id/couriers/:courier_id/assign",
            put(assign_courier),
        )
        .route(
            "/orders/:order_id/couriers/:courier_id/release",
            put(release_courier),
        )
}

async fn get_all_orders(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::find_all_orders(&state)?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::find_order(&state, order_id)?))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<OrderDraft>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Customer)?;
    let customer = accounts::customer_profile(&state, &principal.phone_number)?;
    lifecycle::create_order(&state, draft, customer.id).await?;
    Ok(StatusCode::CREATED)
}

async fn edit_order_by_admin(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
    Json(draft): Json<OrderDraft>,
) -> Result<Json<Order>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::edit_order_by_admin(&state, draft, order_id).await?))
}

async fn edit_order_by_customer(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
    Json(draft): Json<OrderDraft>,
) -> Result<Json<Order>, AppError> {
    principal.require(Role::Customer)?;
    let order =
        lifecycle::edit_order_by_customer(&state, draft, order_id, &principal.phone_number).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Admin)?;
    lifecycle::delete_order(&state, order_id).await?;
    Ok(StatusCode::OK)
}

async fn cancel_order_by_admin(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Admin)?;
    lifecycle::cancel_order(&state, order_id).await?;
    Ok(StatusCode::OK)
}

async fn cancel_order_by_customer(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Customer)?;
    lifecycle::cancel_order_by_customer(&state, order_id, &principal.phone_number).await?;
    Ok(StatusCode::OK)
}

async fn deliver_order_by_admin(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Admin)?;
    lifecycle::deliver_order(&state, order_id).await?;
    Ok(StatusCode::OK)
}

async fn deliver_order_by_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Courier)?;
    lifecycle::deliver_order_by_courier(&state, order_id, &principal.phone_number).await?;
    Ok(StatusCode::OK)
}

async fn assign_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((order_id, courier_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Admin)?;
    lifecycle::assign_courier(&state, order_id, courier_id).await?;
    Ok(StatusCode::OK)
}

/// Couriers assign themselves; the courier id comes from the caller's own
/// profile, never from the request. The reverse (self-release) has no route.
async fn self_assign_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Courier)?;
    let courier = accounts::courier_profile(&state, &principal.phone_number)?;
    lifecycle::assign_courier(&state, order_id, courier.id).await?;
    Ok(StatusCode::OK)
}

async fn release_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((order_id, courier_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    principal.require(Role::Admin)?;
    lifecycle::release_courier(&state, order_id, courier_id).await?;
    Ok(StatusCode::OK)
}

async fn get_own_orders_by_customer(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Customer)?;
    let customer = accounts::customer_profile(&state, &principal.phone_number)?;
    Ok(Json(lifecycle::find_orders_by_customer(&state, customer.id)?))
}

async fn get_orders_by_customer(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::find_orders_by_customer(&state, customer_id)?))
}

async fn get_own_orders_by_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Courier)?;
    let courier = accounts::courier_profile(&state, &principal.phone_number)?;
    Ok(Json(lifecycle::find_orders_by_courier(&state, courier.id)?))
}

async fn get_orders_by_courier(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(courier_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::find_orders_by_courier(&state, courier_id)?))
}

#[derive(Deserialize)]
struct StatusQuery {
    status: String,
}

async fn get_orders_by_status(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    principal.require(Role::Admin)?;
    Ok(Json(lifecycle::find_orders_by_status(&state, &query.status)?))
}
