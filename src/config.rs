//! Service configuration from environment variables

use crate::catalog::DEFAULT_DELIVERY_CHARGE;
use crate::handoff::DEFAULT_TRIGGERS;
use crate::presenter::PaymentDetails;
use crate::state_machine::{DEFAULT_CONFIRM_TOKEN, DEFAULT_RESTART_TOKEN};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub confirm_token: String,
    pub restart_token: String,
    pub delivery_charge: u64,
    pub currency: String,
    pub payment: PaymentDetails,
    /// Handoffs are POSTed here when set, otherwise only logged
    pub operator_webhook: Option<String>,
    pub handoff_triggers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            confirm_token: DEFAULT_CONFIRM_TOKEN.to_string(),
            restart_token: DEFAULT_RESTART_TOKEN.to_string(),
            delivery_charge: DEFAULT_DELIVERY_CHARGE,
            currency: "KES".to_string(),
            payment: PaymentDetails::default(),
            operator_webhook: None,
            handoff_triggers: DEFAULT_TRIGGERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |name: &'static str, default: String| -> Result<String, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(name)),
                Some(v) => Ok(v.trim().to_string()),
            }
        };

        let handoff_triggers = match lookup("DUKA_HANDOFF_TRIGGERS") {
            None => defaults.handoff_triggers,
            Some(list) => {
                let triggers: Vec<String> = list
                    .split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect();
                if triggers.is_empty() {
                    return Err(ConfigError::Empty("DUKA_HANDOFF_TRIGGERS"));
                }
                triggers
            }
        };

        Ok(Self {
            port: parse(&lookup, "DUKA_PORT", defaults.port)?,
            confirm_token: text("DUKA_CONFIRM_TOKEN", defaults.confirm_token)?,
            restart_token: text("DUKA_RESTART_TOKEN", defaults.restart_token)?,
            delivery_charge: parse(&lookup, "DUKA_DELIVERY_CHARGE", defaults.delivery_charge)?,
            currency: text("DUKA_CURRENCY", defaults.currency)?,
            payment: PaymentDetails {
                paybill: text("DUKA_PAYBILL", defaults.payment.paybill)?,
                account_name: text("DUKA_ACCOUNT_NAME", defaults.payment.account_name)?,
            },
            operator_webhook: lookup("DUKA_OPERATOR_WEBHOOK").filter(|v| !v.trim().is_empty()),
            handoff_triggers,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::Invalid { name, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.confirm_token, "YES");
        assert_eq!(config.restart_token, "RESTART");
        assert_eq!(config.delivery_charge, DEFAULT_DELIVERY_CHARGE);
        assert!(config.operator_webhook.is_none());
        assert!(config.handoff_triggers.contains(&"agent".to_string()));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DUKA_PORT", "8080"),
            ("DUKA_CONFIRM_TOKEN", "CONFIRM"),
            ("DUKA_DELIVERY_CHARGE", "0"),
            ("DUKA_OPERATOR_WEBHOOK", "https://ops.example.com/handoff"),
            ("DUKA_HANDOFF_TRIGGERS", "Msaada, , help desk"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.confirm_token, "CONFIRM");
        assert_eq!(config.delivery_charge, 0);
        assert_eq!(
            config.operator_webhook.as_deref(),
            Some("https://ops.example.com/handoff")
        );
        assert_eq!(config.handoff_triggers, vec!["msaada", "help desk"]);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        assert_eq!(
            config_from(&[("DUKA_DELIVERY_CHARGE", "2.50")]).unwrap_err(),
            ConfigError::Invalid {
                name: "DUKA_DELIVERY_CHARGE",
                value: "2.50".to_string()
            }
        );
        assert!(config_from(&[("DUKA_PORT", "http")]).is_err());
    }

    #[test]
    fn test_blank_token_is_an_error() {
        assert_eq!(
            config_from(&[("DUKA_RESTART_TOKEN", "  ")]).unwrap_err(),
            ConfigError::Empty("DUKA_RESTART_TOKEN")
        );
        assert!(config_from(&[("DUKA_HANDOFF_TRIGGERS", " , ")]).is_err());
    }
}
