//! Live-agent handoff detection and operator notification
//!
//! Detection runs on the raw message text before the state machine. Trigger
//! phrases are matched on whole words so that a trigger never fires from
//! inside a longer word ("agent" does not match "agentic", "human" does not
//! match "humanitarian").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Phrases that ask for a person, lower case
pub const DEFAULT_TRIGGERS: &[&str] = &[
    "agent",
    "human",
    "operator",
    "customer care",
    "talk to someone",
];

/// Pure predicate over raw customer text
#[derive(Debug, Clone)]
pub struct HandoffDetector {
    /// Each trigger pre-split into lower-case words
    triggers: Vec<Vec<String>>,
}

impl Default for HandoffDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS.iter().copied())
    }
}

impl HandoffDetector {
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|t| tokenize(t.as_ref()))
            .filter(|words| !words.is_empty())
            .collect();
        Self { triggers }
    }

    /// True when any trigger appears as a run of whole words
    pub fn is_handoff_request(&self, raw_text: &str) -> bool {
        let words = tokenize(raw_text);
        self.triggers.iter().any(|trigger| {
            words
                .windows(trigger.len())
                .any(|window| window == trigger.as_slice())
        })
    }
}

/// Lower-case alphanumeric words; everything else separates
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ============================================================================
// Operator notification
// ============================================================================

/// What the operator channel is told when a customer asks for a person
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffNotice {
    pub id: Uuid,
    pub user_id: String,
    pub raw_text: String,
    pub raised_at: DateTime<Utc>,
}

impl HandoffNotice {
    pub fn new(user_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            raw_text: raw_text.into(),
            raised_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("operator webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("operator webhook returned {0}")]
    Status(reqwest::StatusCode),
}

/// Hook into the human-operator channel
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError>;
}

/// Default notifier: the handoff shows up in the service logs
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl OperatorNotifier for LogNotifier {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError> {
        tracing::warn!(
            notice_id = %notice.id,
            user_id = %notice.user_id,
            text = %notice.raw_text,
            "Customer requested a human operator"
        );
        Ok(())
    }
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each notice as JSON to an operator-side endpoint
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl OperatorNotifier for WebhookNotifier {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(notice).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(notice_id = %notice.id, "Operator webhook accepted handoff");
            Ok(())
        } else {
            Err(NotifyError::Status(status))
        }
    }
}
