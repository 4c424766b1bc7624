use serde::{Deserialize, Serialize};

/// Read-only suburb reference data used for search and pricing.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suburb {
    pub id: i64,
    pub suburb: String,
    pub state: String,
    pub postcode: i32,
    pub price: f64,
}
