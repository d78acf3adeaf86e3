use serde::{Deserialize, Serialize};

use super::Money;

/// A billed line on an invoice. The line total is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// A line the caller wants billed, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl NewLineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }
}
