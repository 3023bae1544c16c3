//! API layer
//!
//! HTTP handlers for:
//! - Public summit content (lists and details)
//! - Settings and the home feed
//! - Account endpoints
//! - Metrics (Prometheus)

mod auth;
mod content;
mod converters;
mod dto;
mod extract;
mod home;
pub mod metrics;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::AppState;

pub use converters::*;
pub use dto::*;
pub use extract::{AppJson, NON_FIELD_ERRORS};
pub use metrics::{metrics_router, track_http_metrics};

/// Create the `/api` router
///
/// Every path keeps its trailing slash.
pub fn api_router() -> Router<AppState> {
    let content_routes = Router::new()
        .route("/hero-slides/", get(content::list_hero_slides))
        .route("/hero-slides/:id/", get(content::get_hero_slide))
        .route("/magazines/", get(content::list_magazines))
        .route("/magazines/:id/", get(content::get_magazine))
        .route("/articles/", get(content::list_articles))
        .route("/articles/:id/", get(content::get_article))
        .route("/embassies/", get(content::list_embassies))
        .route("/embassies/:id/", get(content::get_embassy))
        .route("/events/", get(content::list_events))
        .route("/events/:id/", get(content::get_event))
        .route("/live-feeds/", get(content::list_live_feeds))
        .route("/live-feeds/:id/", get(content::get_live_feed))
        .route("/resources/", get(content::list_resources))
        .route("/resources/:id/", get(content::get_resource))
        .route(
            "/emergency-contacts/",
            get(content::list_emergency_contacts),
        )
        .route(
            "/emergency-contacts/:id/",
            get(content::get_emergency_contact),
        )
        .route("/feature-cards/", get(content::list_feature_cards))
        .route("/feature-cards/:id/", get(content::get_feature_card))
        .route("/settings/", get(home::app_settings))
        .route("/home-feed/", get(home::home_feed));

    let auth_routes = Router::new()
        .route("/auth/register/", post(auth::register))
        .route("/auth/login/", post(auth::login))
        .route("/auth/refresh/", post(auth::refresh))
        .route("/auth/profile/", get(auth::profile))
        .route("/auth/profile/update/", put(auth::update_profile))
        .route("/auth/delete-account/", delete(auth::delete_account))
        .route("/auth/export-data/", get(auth::export_data));

    Router::new().merge(content_routes).merge(auth_routes)
}
