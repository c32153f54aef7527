//! HTTP API Layer
//!
//! REST API for the ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for accounts, entries and reports
//! - **Middleware**: JWT authentication (token subject = owner) and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::in_memory(config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_ledger::{InMemoryLedgerStore, LedgerService};

use crate::config::ApiConfig;
use crate::handlers::{accounts, entries, health, reports};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: LedgerService,
    pub health: Arc<dyn HealthCheckable>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: LedgerService, health: Arc<dyn HealthCheckable>, config: ApiConfig) -> Self {
        Self {
            service,
            health,
            config,
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: ApiConfig) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        Self::new(LedgerService::with_store(store.clone()), store, config)
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let account_routes = Router::new()
        .route("/", get(accounts::list_accounts).post(accounts::create_account))
        .route("/import", post(accounts::import_accounts))
        .route("/standard-chart", post(accounts::load_standard_chart))
        .route("/:code", put(accounts::update_account).delete(accounts::delete_account));

    let entry_routes = Router::new()
        .route("/", get(entries::list_entries).post(entries::create_entry))
        .route(
            "/:id",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route("/:id/lines", put(entries::replace_lines))
        .route("/:id/post", post(entries::post_entry))
        .route("/:id/void", post(entries::void_entry));

    let report_routes = Router::new()
        .route("/general-ledger", get(reports::general_ledger))
        .route("/journal", get(reports::journal))
        .route("/trial-balance", get(reports::trial_balance));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/entries", entry_routes)
        .nest("/reports", report_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
