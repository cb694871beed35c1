use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::error::AppError;
use crate::models::courier::{Courier, CourierStatus};
use crate::models::customer::Customer;
use crate::models::user::{AccountStatus, Role, User};
use crate::state::AppState;
use crate::validate::{self, Findings};

#[derive(Debug, Deserialize)]
pub struct NewCourier {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub inn: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAdmin {
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CourierProfile {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub inn: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerProfile {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub phone_number: String,
}

pub async fn login(state: &AppState, phone_number: &str, password: &str) -> Result<String, AppError> {
    let user = state
        .store
        .user_by_phone(phone_number)
        .filter(|user| auth::verify_password(password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("wrong phone number or password".to_string()))?;

    if user.status == AccountStatus::Blocked {
        return Err(AppError::Forbidden("user is blocked".to_string()));
    }

    state.tokens.issue(&user)
}

pub async fn register_courier(state: &AppState, input: NewCourier) -> Result<UserSummary, AppError> {
    let mut findings = Findings::new();
    validate::check_name(&mut findings, &input.name);
    validate::check_email(&mut findings, &input.email);
    validate::check_phone_number(&mut findings, &input.phone_number);
    validate::check_inn(&mut findings, &input.inn);
    validate::check_password(&mut findings, &input.password);
    validate::check_passwords_match(&mut findings, &input.password, &input.confirm_password);
    findings.into_result()?;

    let password_hash = auth::hash_password(&input.password)?;

    let _guard = state.store.write().await;
    let mut findings = Findings::new();
    validate::check_unique(
        &mut findings,
        "phone_number",
        "this phone number is already taken",
        state.store.user_by_phone(&input.phone_number).map(|u| u.id),
        None,
    );
    validate::check_unique(
        &mut findings,
        "email",
        "this email is already taken",
        state.store.courier_by_email(&input.email).map(|c| c.id),
        None,
    );
    validate::check_unique(
        &mut findings,
        "inn",
        "this INN number is already registered",
        state.store.courier_by_inn(&input.inn).map(|c| c.id),
        None,
    );
    findings.into_result()?;

    let user = User {
        id: Uuid::new_v4(),
        phone_number: input.phone_number,
        password_hash,
        status: AccountStatus::Active,
        roles: vec![Role::Courier],
    };
    let courier = Courier {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: input.name,
        inn: input.inn,
        phone_number: user.phone_number.clone(),
        email: input.email,
        status: CourierStatus::Free,
    };

    let summary = UserSummary {
        id: user.id,
        phone_number: user.phone_number.clone(),
    };
    state.store.couriers.insert(courier.id, courier);
    state.store.users.insert(user.id, user);

    info!(user_id = %summary.id, "courier registered");
    Ok(summary)
}

pub async fn register_customer(
    state: &AppState,
    input: NewCustomer,
) -> Result<UserSummary, AppError> {
    let mut findings = Findings::new();
    validate::check_name(&mut findings, &input.name);
    validate::check_email(&mut findings, &input.email);
    validate::check_phone_number(&mut findings, &input.phone_number);
    validate::check_password(&mut findings, &input.password);
    validate::check_passwords_match(&mut findings, &input.password, &input.confirm_password);
    findings.into_result()?;

    let password_hash = auth::hash_password(&input.password)?;

    let _guard = state.store.write().await;
    let mut findings = Findings::new();
    validate::check_unique(
        &mut findings,
        "phone_number",
        "this phone number is already taken",
        state.store.user_by_phone(&input.phone_number).map(|u| u.id),
        None,
    );
    validate::check_unique(
        &mut findings,
        "email",
        "this email is already taken",
        state.store.customer_by_email(&input.email).map(|c| c.id),
        None,
    );
    findings.into_result()?;

    let user = User {
        id: Uuid::new_v4(),
        phone_number: input.phone_number,
        password_hash,
        status: AccountStatus::Active,
        roles: vec![Role::Customer],
    };
    let customer = Customer {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: input.name,
        phone_number: user.phone_number.clone(),
        email: input.email,
    };

    let summary = UserSummary {
        id: user.id,
        phone_number: user.phone_number.clone(),
    };
    state.store.customers.insert(customer.id, customer);
    state.store.users.insert(user.id, user);

    info!(user_id = %summary.id, "customer registered");
    Ok(summary)
}

/// Admins carry no profile row, only the user record itself.
pub async fn register_admin(state: &AppState, input: NewAdmin) -> Result<UserSummary, AppError> {
    let mut findings = Findings::new();
    validate::check_phone_number(&mut findings, &input.phone_number);
    validate::check_password(&mut findings, &input.password);
    validate::check_passwords_match(&mut findings, &input.password, &input.confirm_password);
    findings.into_result()?;

    let password_hash = auth::hash_password(&input.password)?;

    let _guard = state.store.write().await;
    let mut findings = Findings::new();
    validate::check_unique(
        &mut findings,
        "phone_number",
        "this phone number is already taken",
        state.store.user_by_phone(&input.phone_number).map(|u| u.id),
        None,
    );
    findings.into_result()?;

    let user = User {
        id: Uuid::new_v4(),
        phone_number: input.phone_number,
        password_hash,
        status: AccountStatus::Active,
        roles: vec![Role::Admin],
    };
    let summary = UserSummary {
        id: user.id,
        phone_number: user.phone_number.clone(),
    };
    state.store.users.insert(user.id, user);

    info!(user_id = %summary.id, "admin registered");
    Ok(summary)
}

pub async fn block_user(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    set_account_status(state, user_id, AccountStatus::Blocked).await
}

pub async fn unblock_user(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    set_account_status(state, user_id, AccountStatus::Active).await
}

async fn set_account_status(
    state: &AppState,
    user_id: Uuid,
    status: AccountStatus,
) -> Result<(), AppError> {
    let _guard = state.store.write().await;
    let mut user = state
        .store
        .users
        .get_mut(&user_id)
        .ok_or_else(|| user_not_found(user_id))?;

    user.status = status;
    info!(user_id = %user_id, status = ?status, "account status changed");
    Ok(())
}

/// Removes the user together with any linked courier or customer profile.
/// Deletion is unconditional; open orders keep their customer id.
pub async fn delete_user(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let _guard = state.store.write().await;
    let (_, user) = state
        .store
        .users
        .remove(&user_id)
        .ok_or_else(|| user_not_found(user_id))?;

    if let Some(courier) = state.store.courier_by_user(user_id) {
        state.store.couriers.remove(&courier.id);
    }
    if let Some(customer) = state.store.customer_by_user(user_id) {
        state.store.customers.remove(&customer.id);
    }

    info!(user_id = %user_id, "user deleted");
    Ok(user.phone_number)
}

pub async fn edit_courier_profile(
    state: &AppState,
    user_id: Uuid,
    profile: CourierProfile,
) -> Result<Courier, AppError> {
    let mut findings = Findings::new();
    validate::check_name(&mut findings, &profile.name);
    validate::check_email(&mut findings, &profile.email);
    validate::check_phone_number(&mut findings, &profile.phone_number);
    validate::check_inn(&mut findings, &profile.inn);
    findings.into_result()?;

    let _guard = state.store.write().await;
    let courier = state
        .store
        .courier_by_user(user_id)
        .ok_or_else(|| user_not_found(user_id))?;

    let mut findings = Findings::new();
    validate::check_unique(
        &mut findings,
        "phone_number",
        "this phone number is already taken",
        state.store.user_by_phone(&profile.phone_number).map(|u| u.id),
        Some(user_id),
    );
    validate::check_unique(
        &mut findings,
        "email",
        "this email is already taken",
        state.store.courier_by_email(&profile.email).map(|c| c.id),
        Some(courier.id),
    );
    validate::check_unique(
        &mut findings,
        "inn",
        "this INN number is already registered",
        state.store.courier_by_inn(&profile.inn).map(|c| c.id),
        Some(courier.id),
    );
    findings.into_result()?;

    let updated = Courier {
        id: courier.id,
        user_id,
        name: profile.name,
        inn: profile.inn,
        phone_number: profile.phone_number.clone(),
        email: profile.email,
        status: courier.status,
    };
    state.store.couriers.insert(updated.id, updated.clone());
    if let Some(mut user) = state.store.users.get_mut(&user_id) {
        user.phone_number = profile.phone_number;
    }

    info!(user_id = %user_id, "courier profile edited");
    Ok(updated)
}

pub async fn edit_customer_profile(
    state: &AppState,
    user_id: Uuid,
    profile: CustomerProfile,
) -> Result<Customer, AppError> {
    let mut findings = Findings::new();
    validate::check_name(&mut findings, &profile.name);
    validate::check_email(&mut findings, &profile.email);
    validate::check_phone_number(&mut findings, &profile.phone_number);
    findings.into_result()?;

    let _guard = state.store.write().await;
    let customer = state
        .store
        .customer_by_user(user_id)
        .ok_or_else(|| user_not_found(user_id))?;

    let mut findings = Findings::new();
    validate::check_unique(
        &mut findings,
        "phone_number",
        "this phone number is already taken",
        state.store.user_by_phone(&profile.phone_number).map(|u| u.id),
        Some(user_id),
    );
    validate::check_unique(
        &mut findings,
        "email",
        "this email is already taken",
        state.store.customer_by_email(&profile.email).map(|c| c.id),
        Some(customer.id),
    );
    findings.into_result()?;

    let updated = Customer {
        id: customer.id,
        user_id,
        name: profile.name,
        phone_number: profile.phone_number.clone(),
        email: profile.email,
    };
    state.store.customers.insert(updated.id, updated.clone());
    if let Some(mut user) = state.store.users.get_mut(&user_id) {
        user.phone_number = profile.phone_number;
    }

    info!(user_id = %user_id, "customer profile edited");
    Ok(updated)
}

pub fn courier_profile(state: &AppState, phone_number: &str) -> Result<Courier, AppError> {
    state
        .store
        .courier_by_phone(phone_number)
        .ok_or_else(|| AppError::NotFound("courier profile was not found".to_string()))
}

pub fn customer_profile(state: &AppState, phone_number: &str) -> Result<Customer, AppError> {
    state
        .store
        .customer_by_phone(phone_number)
        .ok_or_else(|| AppError::NotFound("customer profile was not found".to_string()))
}

pub fn all_couriers(state: &AppState) -> Result<Vec<Courier>, AppError> {
    let couriers = state.store.all_couriers();
    if couriers.is_empty() && state.empty_query_is_error {
        return Err(AppError::NoResults("no couriers exist".to_string()));
    }
    Ok(couriers)
}

pub fn all_customers(state: &AppState) -> Result<Vec<Customer>, AppError> {
    let customers = state.store.all_customers();
    if customers.is_empty() && state.empty_query_is_error {
        return Err(AppError::NoResults("no customers exist".to_string()));
    }
    Ok(customers)
}

fn user_not_found(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("user with id {user_id} was not found"))
}
