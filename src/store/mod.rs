use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::courier::Courier;
use crate::models::customer::Customer;
use crate::models::order::{Order, OrderStatus};
use crate::models::user::User;

/// In-process entity tables. Reads go straight to the maps; every
/// read-check-write sequence must run under the guard from [`Store::write`]
/// so paired updates (order + courier) commit as one unit.
pub struct Store {
    pub users: DashMap<Uuid, User>,
    pub couriers: DashMap<Uuid, Courier>,
    pub customers: DashMap<Uuid, Customer>,
    pub orders: DashMap<Uuid, Order>,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            couriers: DashMap::new(),
            customers: DashMap::new(),
            orders: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub fn user_by_phone(&self, phone_number: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.value().phone_number == phone_number)
            .map(|entry| entry.value().clone())
    }

    pub fn courier_by_phone(&self, phone_number: &str) -> Option<Courier> {
        self.couriers
            .iter()
            .find(|entry| entry.value().phone_number == phone_number)
            .map(|entry| entry.value().clone())
    }

    pub fn courier_by_email(&self, email: &str) -> Option<Courier> {
        self.couriers
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
    }

    pub fn courier_by_inn(&self, inn: &str) -> Option<Courier> {
        self.couriers
            .iter()
            .find(|entry| entry.value().inn == inn)
            .map(|entry| entry.value().clone())
    }

    pub fn courier_by_user(&self, user_id: Uuid) -> Option<Courier> {
        self.couriers
            .iter()
            .find(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
    }

    pub fn customer_by_phone(&self, phone_number: &str) -> Option<Customer> {
        self.customers
            .iter()
            .find(|entry| entry.value().phone_number == phone_number)
            .map(|entry| entry.value().clone())
    }

    pub fn customer_by_email(&self, email: &str) -> Option<Customer> {
        self.customers
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
    }

    pub fn customer_by_user(&self, user_id: Uuid) -> Option<Customer> {
        self.customers
            .iter()
            .find(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
    }

    pub fn orders_by_customer(&self, customer_id: Uuid) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.value().customer_id == customer_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn orders_by_courier(&self, courier_id: Uuid) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.value().courier_id == Some(courier_id))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.value().status == status)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn all_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn all_couriers(&self) -> Vec<Courier> {
        self.couriers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn all_customers(&self) -> Vec<Customer> {
        self.customers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
