//! Settings and home feed endpoints

use axum::{Json, extract::State};

use super::converters::*;
use super::dto::*;
use crate::AppState;
use crate::error::AppError;
use crate::service::FeedService;

/// GET /api/settings/
///
/// `{}` with 200 when no settings row exists.
pub async fn app_settings(State(state): State<AppState>) -> Result<Json<SettingsBody>, AppError> {
    let settings = state.db.get_app_settings().await?;
    Ok(Json(settings_to_response(settings.as_ref())))
}

/// GET /api/home-feed/
pub async fn home_feed(State(state): State<AppState>) -> Result<Json<HomeFeedResponse>, AppError> {
    let feed = FeedService::new(state.db.clone()).home_feed().await?;
    let config = &state.config;

    Ok(Json(HomeFeedResponse {
        hero_slides: feed
            .hero_slides
            .iter()
            .map(|slide| hero_slide_to_response(slide, config))
            .collect(),
        featured_articles: feed
            .featured_articles
            .iter()
            .map(|article| article_to_response(article, config))
            .collect(),
        articles: feed
            .articles
            .iter()
            .map(|article| article_to_response(article, config))
            .collect(),
        feature_cards: feed
            .feature_cards
            .iter()
            .map(|card| feature_card_to_response(card, config))
            .collect(),
        settings: settings_to_response(feed.settings.as_ref()),
    }))
}
