//! Pure state transition function
//!
//! Given the same session, context and input this always produces the same
//! result. Persistence and operator notification happen in the dispatcher.

use super::input::{normalize, parse_positive, require_text, ValidationError};
use super::{ConvState, Effect, Reply, Session};
use crate::catalog::{Catalog, Product};
use std::sync::Arc;

/// Immutable configuration shared by every transition
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub catalog: Arc<Catalog>,
    /// Must match exactly (after trimming) to place the order
    pub confirm_token: String,
    /// Matched case-insensitively from any state
    pub restart_token: String,
}

pub const DEFAULT_CONFIRM_TOKEN: &str = "YES";
pub const DEFAULT_RESTART_TOKEN: &str = "RESTART";

impl ConvContext {
    pub fn new(
        catalog: Arc<Catalog>,
        confirm_token: impl Into<String>,
        restart_token: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            confirm_token: confirm_token.into(),
            restart_token: restart_token.into(),
        }
    }

    pub fn is_restart(&self, input: &str) -> bool {
        normalize(input).eq_ignore_ascii_case(&self.restart_token)
    }

    pub fn is_confirmation(&self, input: &str) -> bool {
        normalize(input) == self.confirm_token
    }
}

impl Default for ConvContext {
    fn default() -> Self {
        Self::new(
            Arc::new(Catalog::default()),
            DEFAULT_CONFIRM_TOKEN,
            DEFAULT_RESTART_TOKEN,
        )
    }
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_session: Session,
    /// `None` when the agent must stay silent (operator owns the channel)
    pub reply: Option<Reply>,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            reply: None,
            effects: vec![],
        }
    }

    pub fn with_reply(mut self, reply: Reply) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Leave the session as it was and send a corrective prompt
    fn reprompt(session: &Session, reply: Reply) -> Self {
        Self::new(session.clone()).with_reply(reply)
    }
}

/// Advance the ordering flow by one customer message.
///
/// The restart token wins from every state, `Handoff` included. Handoff
/// detection is not done here; see [`escalate`].
pub fn transition(session: &Session, context: &ConvContext, input: &str) -> TransitionResult {
    let user_id = session.user_id.as_str();

    if context.is_restart(input) {
        return TransitionResult::new(Session::new(user_id)).with_reply(Reply::Restarted);
    }

    match session.state {
        // A first message that is already a valid code skips straight to the
        // quantity step; anything else gets the catalog.
        ConvState::Initial => match select_product(&context.catalog, input) {
            Ok(product) => select(user_id, product),
            Err(_) => {
                TransitionResult::new(Session::awaiting_product(user_id)).with_reply(Reply::Catalog)
            }
        },

        ConvState::AwaitingProduct => match select_product(&context.catalog, input) {
            Ok(product) => select(user_id, product),
            Err(reason) => TransitionResult::reprompt(session, Reply::InvalidProduct { reason }),
        },

        ConvState::AwaitingQuantity => {
            let Some(product) = session.product.clone() else {
                return catalog_again(user_id);
            };
            match parse_positive(input) {
                // Reject quantities whose total could not be represented
                Ok(quantity) if context.catalog.price_for(product.id, quantity).is_some() => {
                    TransitionResult::new(Session::awaiting_location(user_id, product, quantity))
                        .with_reply(Reply::QuantityAccepted { quantity })
                }
                Ok(_) => TransitionResult::reprompt(
                    session,
                    Reply::InvalidQuantity {
                        reason: ValidationError::OutOfRange,
                    },
                ),
                Err(reason) => {
                    TransitionResult::reprompt(session, Reply::InvalidQuantity { reason })
                }
            }
        }

        ConvState::AwaitingLocation => {
            let (Some(product), Some(quantity)) = (session.product.clone(), session.quantity)
            else {
                return catalog_again(user_id);
            };
            let Ok(location) = require_text(input) else {
                return TransitionResult::reprompt(session, Reply::InvalidLocation);
            };
            let Some(quote) = context.catalog.price_for(product.id, quantity) else {
                return catalog_again(user_id);
            };
            TransitionResult::new(Session::awaiting_confirmation(
                user_id,
                product.clone(),
                quantity,
                location,
                quote.total,
            ))
            .with_reply(Reply::OrderSummary {
                product,
                quantity,
                location: location.to_string(),
                quote,
            })
        }

        ConvState::AwaitingConfirmation => match session.total_price {
            Some(total) if context.is_confirmation(input) => {
                TransitionResult::new(Session::new(user_id))
                    .with_reply(Reply::PaymentInstructions { total })
            }
            Some(_) => TransitionResult::reprompt(session, Reply::InvalidConfirmation),
            None => catalog_again(user_id),
        },

        // The operator is talking to the customer; say nothing
        ConvState::Handoff => TransitionResult::new(session.clone()),
    }
}

/// Hand the conversation to a human operator, whatever state it was in
pub fn escalate(session: &Session, raw_text: &str) -> TransitionResult {
    TransitionResult::new(session.clone().into_handoff())
        .with_reply(Reply::HandoffAcknowledged)
        .with_effect(Effect::notify_operator(raw_text))
}

fn select_product(catalog: &Catalog, input: &str) -> Result<Product, ValidationError> {
    let id = parse_positive(input)?;
    catalog.get(id).cloned().ok_or(ValidationError::OutOfRange)
}

fn select(user_id: &str, product: Product) -> TransitionResult {
    TransitionResult::new(Session::awaiting_quantity(user_id, product.clone()))
        .with_reply(Reply::ProductSelected { product })
}

/// Recover from a record whose order fields don't match its state
fn catalog_again(user_id: &str) -> TransitionResult {
    TransitionResult::new(Session::awaiting_product(user_id)).with_reply(Reply::Catalog)
}
