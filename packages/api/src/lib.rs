// ABOUTME: HTTP API layer for Bountyboard providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod apps_handlers;
pub mod auth;
pub mod comments_handlers;
pub mod fanout;
pub mod notifications_handlers;
pub mod pagination;
pub mod ratios_handlers;
pub mod requests_handlers;
pub mod response;
pub mod state;
pub mod transactions_handlers;
pub mod users_handlers;


pub use state::{ApiSettings, DbState};

/// Creates the apps API router
pub fn create_apps_router() -> Router<DbState> {
    Router::new()
        .route("/", get(apps_handlers::list_apps))
        .route("/", post(apps_handlers::create_app))
        .route("/{id}", get(apps_handlers::get_app))
        .route("/{id}/tip", post(apps_handlers::tip_app))
}

/// Creates the feature requests API router
pub fn create_requests_router() -> Router<DbState> {
    Router::new()
        .route("/", get(requests_handlers::list_requests))
        .route("/", post(requests_handlers::create_request))
        .route("/{id}", get(requests_handlers::get_request))
        .route("/{id}", put(requests_handlers::update_request))
        .route("/{id}/status", post(requests_handlers::set_status))
        .route("/{id}/developers", post(requests_handlers::add_developer))
        .route(
            "/{id}/developers",
            delete(requests_handlers::remove_developer),
        )
        .route("/{id}/confirm", post(requests_handlers::confirm_request))
        // Comments and bids
        .route("/{id}/comments", post(comments_handlers::add_comment))
        .route(
            "/{id}/comments/{comment_id}",
            put(comments_handlers::edit_comment),
        )
        .route(
            "/{id}/comments/{comment_id}",
            delete(comments_handlers::delete_comment),
        )
        // Payout ratio negotiation
        .route("/{id}/payment-ratios", get(ratios_handlers::get_ratios))
        .route("/{id}/payment-ratios", put(ratios_handlers::set_ratios))
        .route(
            "/{id}/payment-ratios/accept",
            post(ratios_handlers::accept_ratio),
        )
        .route(
            "/{id}/payment-ratios/messages",
            post(ratios_handlers::post_ratio_message),
        )
        .route(
            "/{id}/payment-ratios/messages",
            get(ratios_handlers::list_ratio_messages),
        )
        // Ledger view
        .route(
            "/{id}/transactions",
            get(transactions_handlers::list_request_transactions),
        )
}

/// Creates the users API router
pub fn create_users_router() -> Router<DbState> {
    Router::new()
        .route("/", post(users_handlers::create_user))
        .route("/{user_id}", get(users_handlers::get_user))
        .route(
            "/{user_id}/stripe-account",
            put(users_handlers::set_stripe_account),
        )
        .route(
            "/{user_id}/currency",
            put(users_handlers::set_preferred_currency),
        )
        .route(
            "/{user_id}/transactions",
            get(transactions_handlers::list_user_transactions),
        )
        .route(
            "/{user_id}/notifications",
            get(notifications_handlers::list_notifications),
        )
        .route(
            "/{user_id}/notifications/{notification_id}/read",
            post(notifications_handlers::mark_notification_read),
        )
        .route(
            "/{user_id}/notifications/read-all",
            post(notifications_handlers::mark_all_notifications_read),
        )
}

/// Assemble the full API under `/api`.
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .nest("/api/apps", create_apps_router())
        .nest("/api/feature-requests", create_requests_router())
        .nest("/api/users", create_users_router())
        .with_state(state)
}
