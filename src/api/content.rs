//! Public content endpoints
//!
//! One list and one detail handler per content type. Paginated lists take
//! `?page=N` plus their exact-match filters; unknown parameters are ignored.

use std::str::FromStr;

use axum::{
    Json,
    extract::{OriginalUri, Path, RawQuery, State},
};

use super::converters::*;
use super::dto::*;
use crate::AppState;
use crate::data::{
    ArticleCategory, ColumnFilter, FileType, LiveFeedStatus, LocationType, PageRequest,
    ResourceCategory, UnknownChoice,
};
use crate::error::{AppError, FieldErrors};

pub const INVALID_BOOLEAN_MESSAGE: &str = "Must be a valid boolean.";

/// Decoded query string of a list request
#[derive(Debug, Default)]
pub(crate) struct ListQuery {
    raw: Option<String>,
    params: Vec<(String, String)>,
}

impl ListQuery {
    pub(crate) fn new(raw: Option<String>) -> Self {
        let params = raw
            .as_deref()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self { raw, params }
    }

    fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Last non-empty value of `key`
    fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(name, value)| name == key && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }

    /// Requested page: a positive integer or `last`; anything else is an invalid page.
    pub(crate) fn page(&self) -> Result<PageRequest, AppError> {
        match self.get("page") {
            None => Ok(PageRequest::default()),
            Some("last") => Ok(PageRequest::last()),
            Some(value) => match value.parse::<u32>() {
                Ok(number) if number >= 1 => Ok(PageRequest::new(number)),
                _ => Err(AppError::InvalidPage),
            },
        }
    }
}

/// Collects filters and their validation errors for one request
struct FilterSet<'q> {
    query: &'q ListQuery,
    filters: Vec<ColumnFilter>,
    errors: FieldErrors,
}

impl<'q> FilterSet<'q> {
    fn new(query: &'q ListQuery) -> Self {
        Self {
            query,
            filters: Vec::new(),
            errors: FieldErrors::new(),
        }
    }

    fn choice<T>(mut self, param: &str, column: &'static str) -> Self
    where
        T: FromStr<Err = UnknownChoice> + ToString,
    {
        if let Some(value) = self.query.get(param) {
            match value.parse::<T>() {
                Ok(choice) => self.filters.push(ColumnFilter::text(column, choice.to_string())),
                Err(error) => self.errors.add(param, error.to_string()),
            }
        }
        self
    }

    fn boolean(mut self, param: &str, column: &'static str) -> Self {
        if let Some(value) = self.query.get(param) {
            match parse_bool(value) {
                Some(flag) => self.filters.push(ColumnFilter::bool(column, flag)),
                None => self.errors.add(param, INVALID_BOOLEAN_MESSAGE),
            }
        }
        self
    }

    fn text(mut self, param: &str, column: &'static str) -> Self {
        if let Some(value) = self.query.get(param) {
            self.filters.push(ColumnFilter::text(column, value));
        }
        self
    }

    fn finish(self) -> Result<Vec<ColumnFilter>, AppError> {
        self.errors.into_result()?;
        Ok(self.filters)
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Path ids that are not integers cannot match any row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

// =============================================================================
// Unpaginated
// =============================================================================

/// GET /api/hero-slides/
pub async fn list_hero_slides(
    State(state): State<AppState>,
) -> Result<Json<Vec<HeroSlideResponse>>, AppError> {
    let slides = state.db.list_hero_slides().await?;
    Ok(Json(
        slides
            .iter()
            .map(|slide| hero_slide_to_response(slide, &state.config))
            .collect(),
    ))
}

/// GET /api/hero-slides/:id/
pub async fn get_hero_slide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HeroSlideResponse>, AppError> {
    let slide = state
        .db
        .get_hero_slide(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(hero_slide_to_response(&slide, &state.config)))
}

/// GET /api/emergency-contacts/
pub async fn list_emergency_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmergencyContactResponse>>, AppError> {
    let contacts = state.db.list_emergency_contacts().await?;
    Ok(Json(
        contacts
            .iter()
            .map(|contact| emergency_contact_to_response(contact, &state.config))
            .collect(),
    ))
}

/// GET /api/emergency-contacts/:id/
pub async fn get_emergency_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmergencyContactResponse>, AppError> {
    let contact = state
        .db
        .get_emergency_contact(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(emergency_contact_to_response(&contact, &state.config)))
}

/// GET /api/feature-cards/
pub async fn list_feature_cards(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeatureCardResponse>>, AppError> {
    let cards = state.db.list_feature_cards().await?;
    Ok(Json(
        cards
            .iter()
            .map(|card| feature_card_to_response(card, &state.config))
            .collect(),
    ))
}

/// GET /api/feature-cards/:id/
pub async fn get_feature_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeatureCardResponse>, AppError> {
    let card = state
        .db
        .get_feature_card(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(feature_card_to_response(&card, &state.config)))
}

// =============================================================================
// Paginated
// =============================================================================

/// GET /api/magazines/
pub async fn list_magazines(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<MagazineEditionResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let page = state.db.list_magazines(query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        magazine_to_response,
    )))
}

/// GET /api/magazines/:id/
pub async fn get_magazine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MagazineEditionResponse>, AppError> {
    let magazine = state
        .db
        .get_magazine(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(magazine_to_response(&magazine, &state.config)))
}

/// GET /api/articles/?category=&is_featured=
pub async fn list_articles(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<ArticleResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let filters = FilterSet::new(&query)
        .choice::<ArticleCategory>("category", "category")
        .boolean("is_featured", "is_featured")
        .finish()?;

    let page = state.db.list_articles(&filters, query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        article_to_response,
    )))
}

/// GET /api/articles/:id/
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleResponse>, AppError> {
    let article = state
        .db
        .get_article(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(article_to_response(&article, &state.config)))
}

/// GET /api/embassies/?type=&country=
pub async fn list_embassies(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<EmbassyLocationResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let filters = FilterSet::new(&query)
        .choice::<LocationType>("type", "type")
        .text("country", "country")
        .finish()?;

    let page = state.db.list_embassies(&filters, query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        embassy_to_response,
    )))
}

/// GET /api/embassies/:id/
pub async fn get_embassy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmbassyLocationResponse>, AppError> {
    let embassy = state
        .db
        .get_embassy(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(embassy_to_response(&embassy, &state.config)))
}

/// GET /api/events/
pub async fn list_events(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<EventResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let page = state.db.list_events(query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        event_to_response,
    )))
}

/// GET /api/events/:id/
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state
        .db
        .get_event(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event_to_response(&event, &state.config)))
}

/// GET /api/live-feeds/?status=
pub async fn list_live_feeds(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<LiveFeedResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let filters = FilterSet::new(&query)
        .choice::<LiveFeedStatus>("status", "status")
        .finish()?;

    let page = state.db.list_live_feeds(&filters, query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        live_feed_to_response,
    )))
}

/// GET /api/live-feeds/:id/
pub async fn get_live_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveFeedResponse>, AppError> {
    let feed = state
        .db
        .get_live_feed(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(live_feed_to_response(&feed, &state.config)))
}

/// GET /api/resources/?category=&file_type=
pub async fn list_resources(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Paginated<ResourceResponse>>, AppError> {
    let query = ListQuery::new(raw);
    let filters = FilterSet::new(&query)
        .choice::<ResourceCategory>("category", "category")
        .choice::<FileType>("file_type", "file_type")
        .finish()?;

    let page = state.db.list_resources(&filters, query.page()?).await?;
    Ok(Json(paginated(
        page,
        &state.config,
        uri.path(),
        query.raw(),
        resource_to_response,
    )))
}

/// GET /api/resources/:id/
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResourceResponse>, AppError> {
    let resource = state
        .db
        .get_resource(parse_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(resource_to_response(&resource, &state.config)))
}
