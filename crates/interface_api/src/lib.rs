//! HTTP API Layer
//!
//! REST API for the estate ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per resource (accounts, journal, billing, reports)
//! - **DTOs**: camelCase request/response bodies; money as decimals
//! - **Error Handling**: domain errors mapped to statuses by kind
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(ledger, billing_store, BillingConfig::default());
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::{BillingConfig, BillingCycleGenerator, BillingStore};
use domain_ledger::Ledger;

use crate::handlers::{accounts, billing, health, journal, reports};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub billing_store: Arc<dyn BillingStore>,
    pub generator: Arc<BillingCycleGenerator>,
}

impl AppState {
    pub fn new(ledger: Ledger, billing_store: Arc<dyn BillingStore>, billing: BillingConfig) -> Self {
        let generator = BillingCycleGenerator::new(&ledger, billing_store.clone(), billing);
        Self {
            ledger,
            billing_store,
            generator: Arc::new(generator),
        }
    }
}

/// Creates the API router
///
/// `/health` and `/health/ready` sit at the root; everything else is
/// under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let account_routes = Router::new()
        .route("/", get(accounts::list_accounts).post(accounts::create_account))
        .route("/:number", get(accounts::get_account))
        .route("/:number/deactivate", post(accounts::deactivate_account))
        .route("/:number/balance", get(accounts::account_balance));

    let journal_routes = Router::new()
        .route("/", post(journal::post_entry))
        .route("/:id", get(journal::get_entry))
        .route("/:id/reverse", post(journal::reverse_entry));

    let billing_routes = Router::new()
        .route("/generate-service-charges", post(billing::generate_service_charges))
        .route("/subjects", post(billing::create_subject))
        .route("/subjects/:id", put(billing::update_subject))
        .route("/subjects/:id/bills", get(billing::list_subject_bills));

    let report_routes = Router::new().route("/trial-balance", get(reports::trial_balance));

    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/journal-entries", journal_routes)
        .nest("/billing", billing_routes)
        .nest("/reports", report_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
