//! Route definitions for the Granary server

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session-less role-checked login
        .route("/login", post(handlers::login))
        // Client registry and balances
        .nest("/clients", client_routes())
        // User account management
        .nest("/users", user_routes())
        // Stock movement ledger
        .nest("/movements", movement_routes())
        // Admin dashboard aggregates
        .nest("/reports", report_routes())
}

/// Client registry routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route("/:client_id/balance", get(handlers::get_client_balance))
}

/// User management routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:user_id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
}

/// Movement ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route("/export", get(handlers::export_movements))
        .route(
            "/unread-count/:user_id",
            get(handlers::get_unread_anomaly_count),
        )
        .route("/:movement_id", patch(handlers::patch_movement))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/stock-summary", get(handlers::get_stock_summary))
}
