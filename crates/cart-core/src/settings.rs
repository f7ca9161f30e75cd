//! # Shopper Settings
//!
//! Per-cart display settings, currently the active currency.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};

/// Settings shared by every view of one cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub active_currency: Currency,
}

impl Settings {
    pub fn new(active_currency: Currency) -> Self {
        Self { active_currency }
    }

    /// Builder: switch the active currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.active_currency = currency;
        self
    }
}
