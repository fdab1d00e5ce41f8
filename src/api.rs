//! HTTP surface: messaging webhook and operator receipt endpoint

mod handlers;
mod twiml;
mod types;

pub use handlers::create_router;

use crate::dispatcher::Dispatcher;
use crate::presenter::Presenter;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub presenter: Arc<Presenter>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, presenter: Presenter) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            presenter: Arc::new(presenter),
        }
    }
}
