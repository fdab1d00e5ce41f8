//! Per-message orchestration
//!
//! One inbound message is one turn: lock the sender's session, check for a
//! handoff request, run the state machine, persist, then fire effects after
//! the lock is released.

use crate::handoff::{HandoffDetector, HandoffNotice, OperatorNotifier};
use crate::session::SessionStore;
use crate::state_machine::{
    escalate, transition, ConvContext, ConvState, Effect, Reply, TransitionResult,
};
use std::sync::Arc;
use thiserror::Error;

/// A customer message as delivered by the webhook
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender id, stable per customer; the session key
    pub from: String,
    /// Raw text, possibly empty
    pub body: String,
}

/// Operator-side notice that a handed-off customer has been dealt with
#[derive(Debug, Clone, Default)]
pub struct Receipt {
    pub customer_id: Option<String>,
    pub message_body: Option<String>,
}

/// Outcome of one conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub state: ConvState,
    /// `None` while a human operator owns the conversation
    pub reply: Option<Reply>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOutcome {
    pub customer_id: String,
    /// Whether a `Handoff` session was returned to `Initial`
    pub reset: bool,
}

/// Boundary contract violations, reported to the caller rather than the customer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

pub struct Dispatcher {
    store: Arc<SessionStore>,
    context: ConvContext,
    detector: HandoffDetector,
    notifier: Arc<dyn OperatorNotifier>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SessionStore>,
        context: ConvContext,
        detector: HandoffDetector,
        notifier: Arc<dyn OperatorNotifier>,
    ) -> Self {
        Self {
            store,
            context,
            detector,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run one conversation turn for the sender.
    ///
    /// Turns for the same sender are serialized by the session lock; turns
    /// for different senders run in parallel.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<Turn, DispatchError> {
        let user_id = required(Some(message.from.as_str()), "From")?;

        let (turn, effects) = {
            let mut guard = self.store.lock(user_id).await;
            let session = guard.session();

            let TransitionResult {
                new_session,
                reply,
                effects,
            } = if self.detector.is_handoff_request(&message.body) {
                escalate(&session, &message.body)
            } else {
                transition(&session, &self.context, &message.body)
            };

            tracing::info!(
                user_id = %guard.user_id(),
                from = %session.state,
                to = %new_session.state,
                replied = reply.is_some(),
                rejected = reply.as_ref().is_some_and(Reply::is_validation_error),
                "Conversation turn"
            );

            let turn = Turn {
                state: new_session.state,
                reply,
            };
            guard.put(new_session);
            self.store.release(guard).await;
            (turn, effects)
        };

        for effect in effects {
            self.run_effect(user_id, effect);
        }
        Ok(turn)
    }

    /// Operator finished with a customer: a `Handoff` session goes back to
    /// `Initial`, any other state is left alone.
    pub async fn handle_receipt(&self, receipt: &Receipt) -> Result<ReceiptOutcome, DispatchError> {
        let customer_id = required(receipt.customer_id.as_deref(), "customerId")?;
        let message_body = required(receipt.message_body.as_deref(), "messageBody")?;

        // An unknown customer is in `Initial`; don't allocate a slot for them
        let (state, reset) = match self.store.lock_existing(customer_id).await {
            Some(mut guard) => {
                let state = guard.session().state;
                let reset = state == ConvState::Handoff;
                if reset {
                    guard.delete();
                }
                self.store.release(guard).await;
                (state, reset)
            }
            None => (ConvState::Initial, false),
        };

        tracing::info!(
            user_id = %customer_id,
            state = %state,
            reset,
            message_len = message_body.len(),
            "Receipt processed"
        );

        Ok(ReceiptOutcome {
            customer_id: customer_id.to_string(),
            reset,
        })
    }

    /// Effects never block the turn and never fail it
    fn run_effect(&self, user_id: &str, effect: Effect) {
        match effect {
            Effect::NotifyOperator { raw_text } => {
                let notifier = Arc::clone(&self.notifier);
                let notice = HandoffNotice::new(user_id, raw_text);
                tokio::spawn(async move {
                    if let Err(e) = notifier.notify(&notice).await {
                        tracing::warn!(
                            notice_id = %notice.id,
                            user_id = %notice.user_id,
                            error = %e,
                            "Failed to notify operator of handoff"
                        );
                    }
                });
            }
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, DispatchError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DispatchError::MissingField(field)),
    }
}
