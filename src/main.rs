//! Duka Chat - scripted ordering over a messaging channel
//!
//! Customers pick a product, a quantity and a delivery location by text,
//! get an order summary and payment instructions, and can ask for a human
//! operator at any point.

mod api;
mod catalog;
mod config;
mod dispatcher;
mod handoff;
mod presenter;
mod session;
mod state_machine;

use api::{create_router, AppState};
use catalog::Catalog;
use config::AppConfig;
use dispatcher::Dispatcher;
use handoff::{HandoffDetector, LogNotifier, OperatorNotifier, WebhookNotifier};
use presenter::Presenter;
use session::SessionStore;
use state_machine::ConvContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duka_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    let catalog = Arc::new(Catalog::with_delivery_charge(config.delivery_charge));
    tracing::info!(
        products = catalog.list_products().len(),
        delivery_charge = catalog.delivery_charge(),
        "Catalog loaded"
    );

    let context = ConvContext::new(
        catalog,
        config.confirm_token.clone(),
        config.restart_token.clone(),
    );

    let notifier: Arc<dyn OperatorNotifier> = match &config.operator_webhook {
        Some(url) => {
            tracing::info!(url = %url, "Handoffs will be posted to operator webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            tracing::warn!("DUKA_OPERATOR_WEBHOOK not set; handoffs are only logged");
            Arc::new(LogNotifier)
        }
    };

    let presenter = Presenter::new(&context, config.currency.clone(), config.payment.clone());
    let dispatcher = Dispatcher::new(
        Arc::new(SessionStore::new()),
        context,
        HandoffDetector::new(&config.handoff_triggers),
        notifier,
    );

    let state = AppState::new(dispatcher, presenter);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Duka chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
