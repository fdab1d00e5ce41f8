//! Effects produced by state transitions

/// Work the dispatcher performs after a transition has been persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Alert the human-operator channel that a customer asked for a person.
    /// Fire-and-forget; a failure never changes the conversation outcome.
    NotifyOperator { raw_text: String },
}

impl Effect {
    pub fn notify_operator(raw_text: impl Into<String>) -> Self {
        Effect::NotifyOperator {
            raw_text: raw_text.into(),
        }
    }
}
