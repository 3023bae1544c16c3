//! API request and response DTOs
//!
//! Public JSON projections of the stored rows. Internal columns such as
//! `created_at` and `is_active` never leave the service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{
    ArticleCategory, ContactType, FileType, LiveFeedStatus, LocationType, ResourceCategory,
};

// =============================================================================
// Pagination
// =============================================================================

/// Page envelope for the paginated list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroSlideResponse {
    pub id: i64,
    pub image: Option<String>,
    pub label: String,
    pub label_fr: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagazineEditionResponse {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub description: String,
    pub description_fr: String,
    pub cover_image: Option<String>,
    pub pdf_file: Option<String>,
    pub publish_date: NaiveDate,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub content: String,
    pub content_fr: String,
    pub image: Option<String>,
    pub author: String,
    pub category: ArticleCategory,
    pub category_display: String,
    pub publish_date: DateTime<Utc>,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbassyLocationResponse {
    pub id: i64,
    pub name: String,
    pub name_fr: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone_number: String,
    pub email: String,
    pub website: String,
    pub opening_hours: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub type_display: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub name_fr: String,
    pub description: String,
    pub description_fr: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub event_date: DateTime<Utc>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveFeedResponse {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub stream_url: String,
    pub thumbnail: Option<String>,
    pub status: LiveFeedStatus,
    pub status_display: String,
    pub viewer_count: i64,
    pub duration: String,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub category: ResourceCategory,
    pub category_display: String,
    pub file: Option<String>,
    pub file_size: String,
    pub file_type: FileType,
    pub file_type_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContactResponse {
    pub id: i64,
    pub name: String,
    pub name_fr: String,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub type_display: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCardResponse {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub description: String,
    pub description_fr: String,
    pub image: Option<String>,
    pub gradient_start: String,
    pub gradient_end: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettingsResponse {
    pub summit_year: String,
    pub summit_theme: String,
    pub summit_theme_fr: String,
    pub website_url: String,
    pub facebook_url: String,
    pub twitter_url: String,
    pub instagram_url: String,
}

/// Settings projection, or `{}` when no settings row exists
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SettingsBody {
    Present(AppSettingsResponse),
    Empty {},
}

/// Home screen payload
#[derive(Debug, Clone, Serialize)]
pub struct HomeFeedResponse {
    pub hero_slides: Vec<HeroSlideResponse>,
    pub featured_articles: Vec<ArticleResponse>,
    pub articles: Vec<ArticleResponse>,
    pub feature_cards: Vec<FeatureCardResponse>,
    pub settings: SettingsBody,
}

// =============================================================================
// Accounts
// =============================================================================

/// Public projection of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Partial profile update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Register and login response
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access: String,
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteAccountResponse {
    pub message: String,
    pub detail: &'static str,
}
