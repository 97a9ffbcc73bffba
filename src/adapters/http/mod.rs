//! HTTP adapters.

mod webhook;

pub use webhook::{webhook_routes, WebhookState};
