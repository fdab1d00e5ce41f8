//! Renders replies as channel text
//!
//! `*text*` marks emphasis; channels without styling show the asterisks.

use crate::catalog::Catalog;
use crate::state_machine::input::ValidationError;
use crate::state_machine::{ConvContext, Reply};
use std::sync::Arc;

/// Where customers send money for a confirmed order
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub paybill: String,
    pub account_name: String,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self {
            paybill: "247247".to_string(),
            account_name: "DUKA".to_string(),
        }
    }
}

pub struct Presenter {
    catalog: Arc<Catalog>,
    currency: String,
    payment: PaymentDetails,
    confirm_token: String,
    restart_token: String,
}

impl Presenter {
    pub fn new(context: &ConvContext, currency: impl Into<String>, payment: PaymentDetails) -> Self {
        Self {
            catalog: Arc::clone(&context.catalog),
            currency: currency.into(),
            payment,
            confirm_token: context.confirm_token.clone(),
            restart_token: context.restart_token.clone(),
        }
    }

    pub fn render(&self, reply: &Reply) -> String {
        match reply {
            Reply::Catalog => self.catalog_listing(),
            Reply::ProductSelected { product } => format!(
                "You selected *{}* ({} each).\nHow many would you like?",
                product.name,
                self.money(product.unit_price)
            ),
            Reply::InvalidProduct { .. } => format!(
                "Sorry, that is not a product number. Please reply with one of the numbers below.\n\n{}",
                self.product_lines()
            ),
            Reply::QuantityAccepted { quantity } => format!(
                "Got it, {quantity} {}.\nWhere should we deliver your order?",
                if *quantity == 1 { "unit" } else { "units" }
            ),
            Reply::InvalidQuantity { reason } => match reason {
                ValidationError::OutOfRange => {
                    "The quantity must be a whole number greater than zero. How many would you like?"
                        .to_string()
                }
                ValidationError::Empty | ValidationError::NotAnInteger => {
                    "Please reply with the quantity as a whole number, for example *2*.".to_string()
                }
            },
            Reply::InvalidLocation => "Please tell us where to deliver your order.".to_string(),
            Reply::OrderSummary {
                product,
                quantity,
                location,
                quote,
            } => format!(
                "*Order summary*\n\
                 Product: {}\n\
                 Quantity: {quantity}\n\
                 Subtotal: {}\n\
                 Delivery: {}\n\
                 *Total: {}*\n\
                 Deliver to: {location}\n\n\
                 Reply *{}* to confirm or *{}* to start over.",
                product.name,
                self.money(quote.subtotal),
                self.money(quote.delivery_charge),
                self.money(quote.total),
                self.confirm_token,
                self.restart_token,
            ),
            Reply::InvalidConfirmation => format!(
                "Please reply *{}* to confirm your order, or *{}* to start over.",
                self.confirm_token, self.restart_token
            ),
            Reply::PaymentInstructions { total } => format!(
                "Thank you for your order!\n\
                 Please pay *{}* via M-Pesa Paybill *{}*, account *{}*.\n\
                 We will dispatch your order as soon as payment is received.",
                self.money(*total),
                self.payment.paybill,
                self.payment.account_name,
            ),
            Reply::Restarted => {
                "Your order has been cleared. Send any message to start again.".to_string()
            }
            Reply::HandoffAcknowledged => {
                "Connecting you to a member of our team. Someone will reply here shortly."
                    .to_string()
            }
        }
    }

    fn catalog_listing(&self) -> String {
        format!(
            "Welcome to *Duka*! What would you like to order?\n\n{}\n\n\
             Reply with the product number. Send *{}* at any time to start over.",
            self.product_lines(),
            self.restart_token
        )
    }

    fn product_lines(&self) -> String {
        self.catalog
            .list_products()
            .iter()
            .map(|product| {
                format!(
                    "{}. {} - {}",
                    product.id,
                    product.name,
                    self.money(product.unit_price)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn money(&self, amount: u64) -> String {
        format!("{} {}", self.currency, group_thousands(amount))
    }
}

/// `1234567` -> `1,234,567`
fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
