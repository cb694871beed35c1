use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourierStatus {
    Free,
    Busy,
}

/// Delivery agent profile. `status` is Busy exactly while the courier is
/// assigned to an in-progress order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub inn: String,
    pub phone_number: String,
    pub email: String,
    pub status: CourierStatus,
}
