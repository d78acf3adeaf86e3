use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub customer_id: String,
    /// Unit category, e.g. "AC Unit" or "Furnace".
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub serial: String,
    pub install_date: NaiveDate,
}
