use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    InProgress,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Parses status query parameters like "new" or "IN_PROGRESS".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "NEW" => Some(Self::New),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELED" => Some(Self::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub sender_address: String,
    pub delivery_address: String,
    pub weight: u32,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub distance_km: u32,
    pub fragile_cargo: bool,
    pub price: f64,
    pub delivery_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub customer_id: Uuid,
    pub courier_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(OrderStatus::parse("new"), Some(OrderStatus::New));
        assert_eq!(OrderStatus::parse("in_progress"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::parse("DELIVERED"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("Canceled"), Some(OrderStatus::Canceled));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
