//! Outgoing replies, independent of how the channel renders them

use super::input::ValidationError;
use crate::catalog::{Product, Quote};

/// What the agent says back after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Greeting plus the numbered product list
    Catalog,
    ProductSelected { product: Product },
    InvalidProduct { reason: ValidationError },
    QuantityAccepted { quantity: u32 },
    InvalidQuantity { reason: ValidationError },
    InvalidLocation,
    OrderSummary {
        product: Product,
        quantity: u32,
        location: String,
        quote: Quote,
    },
    InvalidConfirmation,
    PaymentInstructions { total: u64 },
    Restarted,
    HandoffAcknowledged,
}

impl Reply {
    /// True for the corrective prompts that leave the state unchanged
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Reply::InvalidProduct { .. }
                | Reply::InvalidQuantity { .. }
                | Reply::InvalidLocation
                | Reply::InvalidConfirmation
        )
    }
}
