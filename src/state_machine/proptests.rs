//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{Catalog, Product, DEFAULT_DELIVERY_CHARGE};
use crate::handoff::HandoffDetector;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

const USER: &str = "whatsapp:+254711111111";

fn test_context() -> ConvContext {
    ConvContext::default()
}

fn catalog() -> Catalog {
    Catalog::default()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_product() -> impl Strategy<Value = Product> {
    let products = catalog().list_products().to_vec();
    proptest::sample::select(products)
}

fn arb_quantity() -> impl Strategy<Value = u32> {
    1u32..10_000
}

fn arb_location() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,20}"
}

fn arb_session() -> impl Strategy<Value = Session> {
    let base = prop_oneof![
        Just(Session::new(USER)),
        Just(Session::awaiting_product(USER)),
        arb_product().prop_map(|p| Session::awaiting_quantity(USER, p)),
        (arb_product(), arb_quantity()).prop_map(|(p, q)| Session::awaiting_location(USER, p, q)),
        (arb_product(), arb_quantity(), arb_location()).prop_map(|(p, q, l)| {
            let total = u64::from(q) * p.unit_price + DEFAULT_DELIVERY_CHARGE;
            Session::awaiting_confirmation(USER, p, q, l, total)
        }),
    ];
    (base, any::<bool>()).prop_map(|(s, handoff)| if handoff { s.into_handoff() } else { s })
}

/// Free text that is never the restart token
fn arb_text() -> impl Strategy<Value = String> {
    "[ -~]{0,30}".prop_filter("not restart", |s| !test_context().is_restart(s))
}

/// Integers that are not catalog ids
fn arb_bad_product_code() -> impl Strategy<Value = String> {
    prop_oneof![
        (i64::MIN..=0).prop_map(|n| n.to_string()),
        (5i64..i64::MAX).prop_map(|n| n.to_string()),
        "[a-z]{1,6}",
        (1u32..5, 1u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
    ]
}

fn arb_restart_spelling() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("RESTART".to_string()),
        Just("restart".to_string()),
        Just("  Restart ".to_string()),
        Just("rEsTaRt".to_string()),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_transition_preserves_field_ordering(session in arb_session(), input in "[ -~]{0,30}") {
        let result = transition(&session, &test_context(), &input);
        prop_assert!(result.new_session.is_well_formed(), "{:?}", result.new_session);
        prop_assert_eq!(&result.new_session.user_id, USER);
    }

    #[test]
    fn prop_bad_product_code_leaves_state_unchanged(code in arb_bad_product_code()) {
        let session = Session::awaiting_product(USER);
        let result = transition(&session, &test_context(), &code);
        prop_assert_eq!(&result.new_session, &session);
        prop_assert!(
            matches!(result.reply, Some(Reply::InvalidProduct { .. })),
            "unexpected reply {:?}",
            result.reply
        );
    }

    #[test]
    fn prop_total_is_exact(product in arb_product(), quantity in arb_quantity(), location in arb_location()) {
        let session = Session::awaiting_location(USER, product.clone(), quantity);
        let result = transition(&session, &test_context(), &location);
        let expected = product.unit_price * u64::from(quantity) + DEFAULT_DELIVERY_CHARGE;
        prop_assert_eq!(result.new_session.total_price, Some(expected));
        prop_assert_eq!(catalog().price_for(product.id, quantity).map(|q| q.total), Some(expected));
    }

    #[test]
    fn prop_restart_always_clears(session in arb_session(), token in arb_restart_spelling()) {
        let result = transition(&session, &test_context(), &token);
        prop_assert_eq!(result.new_session, Session::new(USER));
        prop_assert_eq!(result.reply, Some(Reply::Restarted));
    }

    #[test]
    fn prop_handoff_forced_from_any_state(session in arb_session(), prefix in "[a-z ]{0,10}") {
        let text = format!("{prefix} talk to an agent please");
        prop_assert!(HandoffDetector::default().is_handoff_request(&text));
        let result = escalate(&session, &text);
        prop_assert_eq!(result.new_session.state, ConvState::Handoff);
        prop_assert_eq!(result.reply, Some(Reply::HandoffAcknowledged));
    }

    #[test]
    fn prop_handoff_stays_silent(session in arb_session().prop_map(Session::into_handoff), input in arb_text()) {
        let result = transition(&session, &test_context(), &input);
        prop_assert_eq!(&result.new_session, &session);
        prop_assert!(result.reply.is_none());
        prop_assert!(result.effects.is_empty());
    }

    #[test]
    fn prop_confirmation_requires_exact_token(
        product in arb_product(),
        quantity in arb_quantity(),
        attempts in proptest::collection::vec(arb_text().prop_filter("not token", |s| s.trim() != "YES"), 1..5),
    ) {
        let total = product.unit_price * u64::from(quantity) + DEFAULT_DELIVERY_CHARGE;
        let start = Session::awaiting_confirmation(USER, product, quantity, "Mombasa", total);
        let mut session = start.clone();
        for attempt in &attempts {
            let result = transition(&session, &test_context(), attempt);
            prop_assert_eq!(&result.new_session, &start);
            prop_assert_eq!(result.reply, Some(Reply::InvalidConfirmation));
            session = result.new_session;
        }
        let result = transition(&session, &test_context(), "YES");
        prop_assert!(result.new_session.is_initial());
        prop_assert_eq!(result.reply, Some(Reply::PaymentInstructions { total }));
    }

    #[test]
    fn prop_validation_errors_never_change_state(session in arb_session(), input in arb_text()) {
        let result = transition(&session, &test_context(), &input);
        if result.reply.as_ref().is_some_and(Reply::is_validation_error) {
            prop_assert_eq!(result.new_session, session);
        }
    }
}
