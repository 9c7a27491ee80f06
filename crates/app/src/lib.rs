//! Nextbase application composition root
//!
//! Composes the domain routers behind the session middleware.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use nextbase_accounts::{AccountActions, AccountsRepositories, AccountsState, UserStore};
use nextbase_auth::{session_middleware, AuthBackend, AuthConfig};
use nextbase_common::Config;
use nextbase_example::{ExampleRepository, ExampleState, ExampleStore};
use nextbase_supabase::{IdentityProvider, IdentityProviderFactory, ProviderConfig};
use sqlx::PgPool;

/// Collaborators the router is built from
#[derive(Clone)]
pub struct AppServices {
    pub provider: Arc<dyn IdentityProvider>,
    pub users: Arc<dyn UserStore>,
    pub examples: Arc<dyn ExampleStore>,
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let provider = IdentityProviderFactory::create(ProviderConfig {
        provider: config.auth_provider.clone(),
        url: config.supabase_url.clone(),
        anon_key: config.supabase_anon_key.clone(),
        service_role_key: config.supabase_service_role_key.clone(),
    })?;

    let services = AppServices {
        provider,
        users: AccountsRepositories::new(pool.clone()).users,
        examples: Arc::new(ExampleRepository::new(pool)),
    };

    Ok(build_router(&config, services))
}

/// Wire the domain routers with the given services.
/// The session middleware wraps every route except `/health`.
pub fn build_router(config: &Config, services: AppServices) -> Router {
    let auth = AuthBackend::new(services.provider.clone(), AuthConfig::from_config(config));

    let accounts_state = AccountsState {
        actions: AccountActions::new(
            services.provider,
            services.users,
            config.site_url.clone(),
        ),
        auth: auth.clone(),
    };

    let example_state = ExampleState {
        store: services.examples,
        auth: auth.clone(),
    };

    Router::new()
        .route(
            "/",
            get(|| async { "Nextbase API v0.0.1-SNAPSHOT" }),
        )
        .merge(nextbase_accounts::routes().with_state(accounts_state))
        .merge(nextbase_example::routes().with_state(example_state))
        .layer(middleware::from_fn_with_state(auth, session_middleware))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
