//! Conversation state types

use crate::catalog::Product;
use std::fmt;

// ============================================================================
// Conversation State
// ============================================================================

/// Where a customer is in the ordering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvState {
    /// No flow in progress. Equivalent to having no session at all.
    #[default]
    Initial,

    /// Catalog shown, waiting for a selection code
    AwaitingProduct,

    /// Product chosen, waiting for a positive quantity
    AwaitingQuantity,

    /// Quantity recorded, waiting for a delivery location
    AwaitingLocation,

    /// Order summary shown, waiting for the confirmation token
    AwaitingConfirmation,

    /// A human operator owns the conversation; scripted replies are suspended
    Handoff,
}

impl ConvState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConvState::Initial => "initial",
            ConvState::AwaitingProduct => "awaiting_product",
            ConvState::AwaitingQuantity => "awaiting_quantity",
            ConvState::AwaitingLocation => "awaiting_location",
            ConvState::AwaitingConfirmation => "awaiting_confirmation",
            ConvState::Handoff => "handoff",
        }
    }
}

impl fmt::Display for ConvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Per-customer conversation record
///
/// Order fields are filled strictly in order: `product`, `quantity`,
/// `location`, then `total_price`. The stage constructors below are the only
/// way the transition function builds sessions, which keeps that ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub state: ConvState,
    pub product: Option<Product>,
    pub quantity: Option<u32>,
    pub location: Option<String>,
    /// `unit_price * quantity + delivery_charge`, set when the summary is shown
    pub total_price: Option<u64>,
}

impl Session {
    /// A fresh `Initial` session with every order field cleared
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: ConvState::Initial,
            product: None,
            quantity: None,
            location: None,
            total_price: None,
        }
    }

    pub fn awaiting_product(user_id: impl Into<String>) -> Self {
        Self {
            state: ConvState::AwaitingProduct,
            ..Self::new(user_id)
        }
    }

    pub fn awaiting_quantity(user_id: impl Into<String>, product: Product) -> Self {
        Self {
            state: ConvState::AwaitingQuantity,
            product: Some(product),
            ..Self::new(user_id)
        }
    }

    pub fn awaiting_location(user_id: impl Into<String>, product: Product, quantity: u32) -> Self {
        Self {
            state: ConvState::AwaitingLocation,
            quantity: Some(quantity),
            ..Self::awaiting_quantity(user_id, product)
        }
    }

    pub fn awaiting_confirmation(
        user_id: impl Into<String>,
        product: Product,
        quantity: u32,
        location: impl Into<String>,
        total_price: u64,
    ) -> Self {
        Self {
            state: ConvState::AwaitingConfirmation,
            location: Some(location.into()),
            total_price: Some(total_price),
            ..Self::awaiting_location(user_id, product, quantity)
        }
    }

    /// Same record, owned by a human operator.
    ///
    /// The draft order is kept so the operator can see what the customer had
    /// chosen; leaving `Handoff` always goes through a full reset.
    pub fn into_handoff(self) -> Self {
        Self {
            state: ConvState::Handoff,
            ..self
        }
    }

    pub fn is_initial(&self) -> bool {
        self.state == ConvState::Initial
    }

    /// Check that the order fields match what the state promises
    #[cfg(test)]
    pub fn is_well_formed(&self) -> bool {
        let filled = (
            self.product.is_some(),
            self.quantity.is_some(),
            self.location.is_some(),
            self.total_price.is_some(),
        );
        match self.state {
            ConvState::Initial | ConvState::AwaitingProduct => {
                filled == (false, false, false, false)
            }
            ConvState::AwaitingQuantity => filled == (true, false, false, false),
            ConvState::AwaitingLocation => filled == (true, true, false, false),
            ConvState::AwaitingConfirmation => filled == (true, true, true, true),
            // Handoff keeps whatever prefix of the order existed
            ConvState::Handoff => matches!(
                filled,
                (false, false, false, false)
                    | (true, false, false, false)
                    | (true, true, false, false)
                    | (true, true, true, true)
            ),
        }
    }
}
