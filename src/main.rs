//! ProficienThAI service entry point.
//!
//! Loads configuration, runs migrations, wires the adapters into the
//! conversation controller, and serves the webhook.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use proficienthai::adapters::ai::OpenRouterEvaluator;
use proficienthai::adapters::http::{webhook_routes, WebhookState};
use proficienthai::adapters::line::LineMessagingClient;
use proficienthai::adapters::postgres::{
    PgBadgeRepository, PgFeedbackRepository, PgQuestionBank, PgSubmissionRepository,
    PgTaskRepository, PgUserRepository,
};
use proficienthai::adapters::session::{InMemorySessionStore, RedisSessionStore};
use proficienthai::application::ConversationController;
use proficienthai::config::AppConfig;
use proficienthai::domain::webhook::LineSignatureVerifier;
use proficienthai::ports::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    // Redis when configured (multi-instance), otherwise the process-local
    // map. The controller only sees the trait.
    let sessions: Arc<dyn SessionStore> = match &config.redis.url {
        Some(url) => {
            tracing::info!("using redis session store");
            Arc::new(RedisSessionStore::connect(url, config.server.session_ttl()).await?)
        }
        None => {
            tracing::info!("using in-memory session store");
            Arc::new(InMemorySessionStore::new(config.server.session_ttl()))
        }
    };

    let verifier = Arc::new(LineSignatureVerifier::new(
        config.line.channel_secret.expose_secret().clone(),
    ));
    let gateway = Arc::new(LineMessagingClient::new(config.line.clone()));
    let evaluator = Arc::new(OpenRouterEvaluator::new(config.ai.clone()));

    let controller = Arc::new(ConversationController::new(
        sessions,
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgTaskRepository::new(pool.clone())),
        Arc::new(PgSubmissionRepository::new(pool.clone())),
        Arc::new(PgFeedbackRepository::new(pool.clone())),
        Arc::new(PgQuestionBank::new(pool.clone())),
        Arc::new(PgBadgeRepository::new(pool)),
        evaluator,
        gateway,
    ));

    let app = webhook_routes(WebhookState {
        verifier,
        controller,
    })
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "webhook server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
