use std::time::Instant;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::pricing::shipping_cost;
use crate::error::AppError;
use crate::models::courier::CourierStatus;
use crate::models::order::{Order, OrderStatus, PaymentMethod};
use crate::state::AppState;
use crate::validate;

const DELIVERY_WINDOW_DAYS: i64 = 10;

/// Caller-supplied order fields. Status, price, distance, dates and the
/// courier link are always derived server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub sender_address: String,
    pub delivery_address: String,
    pub weight: u32,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    pub fragile_cargo: bool,
}

/// Resolves the draft's addresses to a distance. Runs before the store write
/// lock is taken so the lock never waits on the network.
async fn lookup_distance(state: &AppState, draft: &OrderDraft) -> Result<u32, AppError> {
    let start = Instant::now();
    let result = state
        .distance
        .distance_km(&draft.sender_address, &draft.delivery_address)
        .await;
    state
        .metrics
        .distance_lookup_seconds
        .observe(start.elapsed().as_secs_f64());

    result.map_err(|err| {
        warn!(error = %err, "distance lookup failed");
        AppError::Upstream(format!("enter a valid address: {err}"))
    })
}

pub async fn create_order(
    state: &AppState,
    draft: OrderDraft,
    customer_id: Uuid,
) -> Result<Order, AppError> {
    validate::order_draft(&draft)?;

    if !state.store.customers.contains_key(&customer_id) {
        return Err(AppError::NotFound(format!(
            "customer with id {customer_id} was not found"
        )));
    }

    let distance_km = lookup_distance(state, &draft).await?;
    let now = Utc::now();

    let order = Order {
        id: Uuid::new_v4(),
        price: shipping_cost(distance_km, draft.weight, draft.fragile_cargo),
        sender_address: draft.sender_address,
        delivery_address: draft.delivery_address,
        weight: draft.weight,
        description: draft.description,
        payment_method: draft.payment_method,
        status: OrderStatus::New,
        distance_km,
        fragile_cargo: draft.fragile_cargo,
        delivery_date: (now + Duration::days(DELIVERY_WINDOW_DAYS)).date_naive(),
        created_at: now,
        customer_id,
        courier_id: None,
    };

    let _guard = state.store.write().await;
    state.store.orders.insert(order.id, order.clone());
    state.metrics.orders_created_total.inc();

    info!(order_id = %order.id, customer_id = %customer_id, "order created");
    Ok(order)
}

/// Admin edit: recomputes distance and price from the new draft, keeps the
/// original status, courier link, dates and customer.
pub async fn edit_order_by_admin(
    state: &AppState,
    draft: OrderDraft,
    order_id: Uuid,
) -> Result<Order, AppError> {
    apply_order_edit(state, draft, order_id, false).await
}

async fn apply_order_edit(
    state: &AppState,
    draft: OrderDraft,
    order_id: Uuid,
    require_new: bool,
) -> Result<Order, AppError> {
    validate::order_draft(&draft)?;

    if !state.store.orders.contains_key(&order_id) {
        return Err(order_not_found(order_id));
    }

    let distance_km = lookup_distance(state, &draft).await?;

    let _guard = state.store.write().await;
    let previous = state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| order_not_found(order_id))?;

    // An assignment may have landed between the caller's check and the
    // lock, so the customer path re-verifies the status here.
    if require_new && previous.status != OrderStatus::New {
        return Err(AppError::StateConflict(
            "order cannot be changed, it is already in process".to_string(),
        ));
    }

    let order = Order {
        id: previous.id,
        price: shipping_cost(distance_km, draft.weight, draft.fragile_cargo),
        sender_address: draft.sender_address,
        delivery_address: draft.delivery_address,
        weight: draft.weight,
        description: draft.description,
        payment_method: draft.payment_method,
        status: previous.status,
        distance_km,
        fragile_cargo: draft.fragile_cargo,
        delivery_date: previous.delivery_date,
        created_at: previous.created_at,
        customer_id: previous.customer_id,
        courier_id: previous.courier_id,
    };

    state.store.orders.insert(order.id, order.clone());
    info!(order_id = %order.id, "order edited");
    Ok(order)
}

pub async fn edit_order_by_customer(
    state: &AppState,
    draft: OrderDraft,
    order_id: Uuid,
    customer_phone: &str,
) -> Result<Order, AppError> {
    let order = owned_order(state, order_id, customer_phone)?;

    if order.status != OrderStatus::New {
        return Err(AppError::StateConflict(
            "order cannot be changed, it is already in process".to_string(),
        ));
    }

    apply_order_edit(state, draft, order_id, true).await
}

pub async fn cancel_order(state: &AppState, order_id: Uuid) -> Result<(), AppError> {
    let _guard = state.store.write().await;
    let mut order = state
        .store
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| order_not_found(order_id))?;

    if order.status != OrderStatus::New {
        return Err(AppError::StateConflict(
            "order is already in progress or delivered".to_string(),
        ));
    }

    order.status = OrderStatus::Canceled;
    state.metrics.order_cancellations_total.inc();

    info!(order_id = %order_id, "order canceled");
    Ok(())
}

pub async fn cancel_order_by_customer(
    state: &AppState,
    order_id: Uuid,
    customer_phone: &str,
) -> Result<(), AppError> {
    owned_order(state, order_id, customer_phone)?;
    cancel_order(state, order_id).await
}

pub async fn deliver_order(state: &AppState, order_id: Uuid) -> Result<(), AppError> {
    let _guard = state.store.write().await;
    let mut order = state
        .store
        .orders
        .get_mut(&order_id)
        .ok_or_else(|| order_not_found(order_id))?;

    if order.status != OrderStatus::InProgress {
        return Err(AppError::StateConflict(
            "order cannot be delivered, it is not in progress".to_string(),
        ));
    }

    // The courier stays BUSY after delivery until an admin releases them.
    order.status = OrderStatus::Delivered;
    state.metrics.order_deliveries_total.inc();

    info!(order_id = %order_id, "order delivered");
    Ok(())
}

pub async fn deliver_order_by_courier(
    state: &AppState,
    order_id: Uuid,
    courier_phone: &str,
) -> Result<(), AppError> {
    let courier = state
        .store
        .courier_by_phone(courier_phone)
        .ok_or_else(|| AppError::NotFound("courier profile was not found".to_string()))?;

    let owns_order = state
        .store
        .orders_by_courier(courier.id)
        .iter()
        .any(|order| order.id == order_id);
    if !owns_order {
        return Err(AppError::Validation(
            "this courier does not have this order".to_string(),
        ));
    }

    deliver_order(state, order_id).await
}

pub async fn delete_order(state: &AppState, order_id: Uuid) -> Result<(), AppError> {
    let _guard = state.store.write().await;
    let status = state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().status)
        .ok_or_else(|| order_not_found(order_id))?;

    if status != OrderStatus::New {
        return Err(AppError::StateConflict(
            "order cannot be deleted, it is already in process".to_string(),
        ));
    }

    state.store.orders.remove(&order_id);
    info!(order_id = %order_id, "order deleted");
    Ok(())
}

/// Links a free courier to a new order. Both rows change together under the
/// store write lock: the order becomes IN_PROGRESS, the courier BUSY.
pub async fn assign_courier(
    state: &AppState,
    order_id: Uuid,
    courier_id: Uuid,
) -> Result<(), AppError> {
    let _guard = state.store.write().await;

    let order_status = state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().status)
        .ok_or_else(|| order_not_found(order_id))?;
    let courier_status = state
        .store
        .couriers
        .get(&courier_id)
        .map(|entry| entry.value().status)
        .ok_or_else(|| courier_not_found(courier_id))?;

    if courier_status != CourierStatus::Free {
        state
            .metrics
            .assignments_total
            .with_label_values(&["rejected"])
            .inc();
        return Err(AppError::StateConflict(format!(
            "courier with id {courier_id} is already busy"
        )));
    }
    if order_status != OrderStatus::New {
        state
            .metrics
            .assignments_total
            .with_label_values(&["rejected"])
            .inc();
        return Err(AppError::StateConflict(format!(
            "order with id {order_id} is unavailable for assignment"
        )));
    }

    if let Some(mut order) = state.store.orders.get_mut(&order_id) {
        order.status = OrderStatus::InProgress;
        order.courier_id = Some(courier_id);
    }
    if let Some(mut courier) = state.store.couriers.get_mut(&courier_id) {
        courier.status = CourierStatus::Busy;
    }
    state
        .metrics
        .assignments_total
        .with_label_values(&["success"])
        .inc();

    info!(order_id = %order_id, courier_id = %courier_id, "courier assigned");
    Ok(())
}

/// Admin-only counterpart of [`assign_courier`]: unlinks the courier and
/// returns the order to NEW. Couriers may not release themselves.
pub async fn release_courier(
    state: &AppState,
    order_id: Uuid,
    courier_id: Uuid,
) -> Result<(), AppError> {
    let _guard = state.store.write().await;

    let order = state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| order_not_found(order_id))?;
    let courier_status = state
        .store
        .couriers
        .get(&courier_id)
        .map(|entry| entry.value().status)
        .ok_or_else(|| courier_not_found(courier_id))?;

    if order.status != OrderStatus::InProgress
        || courier_status != CourierStatus::Busy
        || order.courier_id != Some(courier_id)
    {
        return Err(AppError::StateConflict(format!(
            "courier with id {courier_id} cannot be released from order {order_id}"
        )));
    }

    if let Some(mut order) = state.store.orders.get_mut(&order_id) {
        order.status = OrderStatus::New;
        order.courier_id = None;
    }
    if let Some(mut courier) = state.store.couriers.get_mut(&courier_id) {
        courier.status = CourierStatus::Free;
    }

    info!(order_id = %order_id, courier_id = %courier_id, "courier released");
    Ok(())
}

pub fn find_order(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| order_not_found(order_id))
}

pub fn find_all_orders(state: &AppState) -> Result<Vec<Order>, AppError> {
    ensure_results(state, state.store.all_orders(), "no orders exist")
}

pub fn find_orders_by_customer(
    state: &AppState,
    customer_id: Uuid,
) -> Result<Vec<Order>, AppError> {
    if !state.store.customers.contains_key(&customer_id) {
        return Err(AppError::NotFound(format!(
            "customer with id {customer_id} was not found"
        )));
    }

    ensure_results(
        state,
        state.store.orders_by_customer(customer_id),
        "this customer has no orders",
    )
}

pub fn find_orders_by_courier(state: &AppState, courier_id: Uuid) -> Result<Vec<Order>, AppError> {
    if !state.store.couriers.contains_key(&courier_id) {
        return Err(courier_not_found(courier_id));
    }

    ensure_results(
        state,
        state.store.orders_by_courier(courier_id),
        "this courier has no orders",
    )
}

pub fn find_orders_by_status(state: &AppState, raw_status: &str) -> Result<Vec<Order>, AppError> {
    let status = OrderStatus::parse(raw_status)
        .ok_or_else(|| AppError::Validation(format!("unknown order status '{raw_status}'")))?;

    ensure_results(
        state,
        state.store.orders_by_status(status),
        "no orders with this status",
    )
}

/// Empty finder results are an error by default, kept for compatibility with
/// existing callers; `empty_query_is_error` is the single switch for it.
fn ensure_results(
    state: &AppState,
    orders: Vec<Order>,
    context: &str,
) -> Result<Vec<Order>, AppError> {
    if orders.is_empty() && state.empty_query_is_error {
        return Err(AppError::NoResults(context.to_string()));
    }
    Ok(orders)
}

/// Looks the order up among the calling customer's own orders.
fn owned_order(state: &AppState, order_id: Uuid, customer_phone: &str) -> Result<Order, AppError> {
    let customer = state
        .store
        .customer_by_phone(customer_phone)
        .ok_or_else(|| AppError::NotFound("customer profile was not found".to_string()))?;

    state
        .store
        .orders_by_customer(customer.id)
        .into_iter()
        .find(|order| order.id == order_id)
        .ok_or_else(|| AppError::Validation("this customer does not have this order".to_string()))
}

fn order_not_found(order_id: Uuid) -> AppError {
    AppError::NotFound(format!("order with id {order_id} was not found"))
}

fn courier_not_found(courier_id: Uuid) -> AppError {
    AppError::NotFound(format!("courier with id {courier_id} was not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::auth::TokenManager;
    use crate::geo::FixedDistance;
    use crate::models::courier::Courier;
    use crate::models::customer::Customer;

    fn test_state(distance_km: u32) -> AppState {
        AppState::new(
            Arc::new(FixedDistance(distance_km)),
            TokenManager::new("test-secret", 3600),
            true,
        )
    }

    fn seed_customer(state: &AppState) -> Uuid {
        let customer = Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "John".to_string(),
            phone_number: "+79999999902".to_string(),
            email: "customer@example.com".to_string(),
        };
        let id = customer.id;
        state.store.customers.insert(id, customer);
        id
    }

    fn seed_courier(state: &AppState) -> Uuid {
        let courier = Courier {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ivan".to_string(),
            inn: "123412341234".to_string(),
            phone_number: "+79999999903".to_string(),
            email: "courier@example.com".to_string(),
            status: CourierStatus::Free,
        };
        let id = courier.id;
        state.store.couriers.insert(id, courier);
        id
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            sender_address: "Moscow".to_string(),
            delivery_address: "Paris".to_string(),
            weight: 7,
            description: None,
            payment_method: PaymentMethod::Cash,
            fragile_cargo: false,
        }
    }

    #[tokio::test]
    async fn create_then_find_returns_new_unassigned_order() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);

        let created = create_order(&state, draft(), customer_id).await.unwrap();
        let found = find_order(&state, created.id).unwrap();

        assert_eq!(found.status, OrderStatus::New);
        assert_eq!(found.courier_id, None);
        assert_eq!(found.distance_km, 632);
        assert_eq!(found.price, 9.48);
        assert_eq!(found.customer_id, customer_id);
        assert_eq!(
            found.delivery_date,
            (found.created_at + Duration::days(10)).date_naive()
        );
    }

    #[tokio::test]
    async fn create_for_unknown_customer_fails() {
        let state = test_state(632);

        let err = create_order(&state, draft(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn assignment_links_both_rows_and_is_not_repeatable() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();

        assign_courier(&state, order.id, courier_id).await.unwrap();

        let order = find_order(&state, order.id).unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.courier_id, Some(courier_id));
        assert_eq!(
            state.store.couriers.get(&courier_id).unwrap().status,
            CourierStatus::Busy
        );

        let second = create_order(&state, draft(), customer_id).await.unwrap();
        let err = assign_courier(&state, second.id, courier_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
    }

    #[tokio::test]
    async fn release_returns_order_to_new_and_frees_courier() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();
        assign_courier(&state, order.id, courier_id).await.unwrap();

        release_courier(&state, order.id, courier_id).await.unwrap();

        let order = find_order(&state, order.id).unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.courier_id, None);
        assert_eq!(
            state.store.couriers.get(&courier_id).unwrap().status,
            CourierStatus::Free
        );
    }

    #[tokio::test]
    async fn release_of_unassigned_courier_is_a_conflict() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();

        let err = release_courier(&state, order.id, courier_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StateConflict(_)));
    }

    #[tokio::test]
    async fn delete_is_only_allowed_while_new() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();
        assign_courier(&state, order.id, courier_id).await.unwrap();

        let err = delete_order(&state, order.id).await.unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));

        release_courier(&state, order.id, courier_id).await.unwrap();
        delete_order(&state, order.id).await.unwrap();
        assert!(matches!(
            find_order(&state, order.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn customer_edit_is_rejected_once_in_progress_but_admin_edit_works() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();
        assign_courier(&state, order.id, courier_id).await.unwrap();

        let err = edit_order_by_customer(&state, draft(), order.id, "+79999999902")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));

        let mut heavier = draft();
        heavier.weight = 12;
        let edited = edit_order_by_admin(&state, heavier, order.id).await.unwrap();
        assert_eq!(edited.status, OrderStatus::InProgress);
        assert_eq!(edited.courier_id, Some(courier_id));
        assert_eq!(edited.price, 12.64);
        assert_eq!(edited.created_at, order.created_at);
    }

    #[tokio::test]
    async fn customer_edit_rechecks_status_when_committing() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();

        // Flip the order after the caller-side check would have passed,
        // as a concurrent assignment does.
        state
            .store
            .orders
            .get_mut(&order.id)
            .unwrap()
            .status = OrderStatus::InProgress;

        let mut heavier = draft();
        heavier.weight = 12;
        let err = apply_order_edit(&state, heavier, order.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));

        let stored = find_order(&state, order.id).unwrap();
        assert_eq!(stored.weight, 7);
        assert_eq!(stored.price, 9.48);
    }

    #[tokio::test]
    async fn customer_cannot_touch_someone_elses_order() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();

        let stranger = Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Mallory".to_string(),
            phone_number: "+79999999911".to_string(),
            email: "mallory@example.com".to_string(),
        };
        state.store.customers.insert(stranger.id, stranger);

        let err = cancel_order_by_customer(&state, order.id, "+79999999911")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_is_terminal_and_only_from_new() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();

        cancel_order(&state, order.id).await.unwrap();
        assert_eq!(find_order(&state, order.id).unwrap().status, OrderStatus::Canceled);

        let err = cancel_order(&state, order.id).await.unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
    }

    #[tokio::test]
    async fn delivered_order_rejects_further_transitions() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();
        assign_courier(&state, order.id, courier_id).await.unwrap();

        deliver_order(&state, order.id).await.unwrap();
        assert_eq!(find_order(&state, order.id).unwrap().status, OrderStatus::Delivered);

        assert!(matches!(
            cancel_order(&state, order.id).await.unwrap_err(),
            AppError::StateConflict(_)
        ));
        assert!(matches!(
            deliver_order(&state, order.id).await.unwrap_err(),
            AppError::StateConflict(_)
        ));
        assert!(matches!(
            delete_order(&state, order.id).await.unwrap_err(),
            AppError::StateConflict(_)
        ));
    }

    #[tokio::test]
    async fn courier_may_deliver_only_their_own_order() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);
        let courier_id = seed_courier(&state);
        let order = create_order(&state, draft(), customer_id).await.unwrap();
        assign_courier(&state, order.id, courier_id).await.unwrap();

        let other = Courier {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Petr".to_string(),
            inn: "432143214321".to_string(),
            phone_number: "+79999999904".to_string(),
            email: "petr@example.com".to_string(),
            status: CourierStatus::Free,
        };
        state.store.couriers.insert(other.id, other);

        let err = deliver_order_by_courier(&state, order.id, "+79999999904")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        deliver_order_by_courier(&state, order.id, "+79999999903")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_finder_results_are_errors_by_default() {
        let state = test_state(632);
        let customer_id = seed_customer(&state);

        assert!(matches!(
            find_all_orders(&state),
            Err(AppError::NoResults(_))
        ));
        assert!(matches!(
            find_orders_by_customer(&state, customer_id),
            Err(AppError::NoResults(_))
        ));
        assert!(matches!(
            find_orders_by_status(&state, "delivered"),
            Err(AppError::NoResults(_))
        ));
    }

    #[tokio::test]
    async fn empty_finder_results_can_be_plain_lists() {
        let mut state = test_state(632);
        state.empty_query_is_error = false;

        assert_eq!(find_all_orders(&state).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_status_string_is_a_validation_error() {
        let state = test_state(632);

        assert!(matches!(
            find_orders_by_status(&state, "shipped"),
            Err(AppError::Validation(_))
        ));
    }
}
