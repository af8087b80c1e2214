//! HTTP API
//!
//! `POST /chat`, `GET /version`, and static assets for the browser client.
//! The server keeps no conversation state: every request carries its full
//! history.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::dispatch::Dispatcher;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Filesystem fallback for assets not embedded in the binary
    pub public_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, public_dir: PathBuf) -> Self {
        Self {
            dispatcher,
            public_dir: Arc::new(public_dir),
        }
    }
}
