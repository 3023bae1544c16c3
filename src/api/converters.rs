//! Conversion functions from database models to API DTOs

use url::Url;

use crate::api::dto::*;
use crate::config::AppConfig;
use crate::data::{
    AppSettings, Article, EmbassyLocation, EmergencyContact, Event, FeatureCard, HeroSlide,
    LiveFeed, MagazineEdition, Page, Resource, User,
};

/// Absolute URL for a stored media path
///
/// Blank paths (no upload) become `None`; values that are already
/// absolute `http(s)` URLs pass through untouched.
pub fn media_url(path: &str, config: &AppConfig) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }

    Some(format!(
        "{}/{}",
        config.storage.media.public_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Link to another page of the same listing
///
/// Keeps every query parameter except `page`, which is set to `page`
/// or dropped for the first page.
pub fn page_url(base_url: &str, path: &str, query: Option<&str>, page: u32) -> Option<String> {
    let mut url = match Url::parse(base_url).and_then(|base| base.join(path)) {
        Ok(url) => url,
        Err(error) => {
            tracing::warn!(%error, base_url, path, "Failed to build pagination link");
            return None;
        }
    };

    let kept: Vec<(String, String)> = query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .filter(|(key, _)| key != "page")
                .collect()
        })
        .unwrap_or_default();

    url.set_query(None);
    if !kept.is_empty() || page > 1 {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    Some(url.into())
}

/// Wrap one page of rows in the list envelope
pub fn paginated<T, U>(
    page: Page<T>,
    config: &AppConfig,
    path: &str,
    query: Option<&str>,
    convert: impl Fn(&T, &AppConfig) -> U,
) -> Paginated<U> {
    let base_url = config.server.base_url();
    let next = page
        .has_next()
        .then(|| page_url(&base_url, path, query, page.number + 1))
        .flatten();
    let previous = page
        .has_previous()
        .then(|| page_url(&base_url, path, query, page.number - 1))
        .flatten();

    Paginated {
        count: page.count,
        next,
        previous,
        results: page.items.iter().map(|item| convert(item, config)).collect(),
    }
}

pub fn hero_slide_to_response(slide: &HeroSlide, config: &AppConfig) -> HeroSlideResponse {
    HeroSlideResponse {
        id: slide.id,
        image: media_url(&slide.image, config),
        label: slide.label.clone(),
        label_fr: slide.label_fr.clone(),
        order: slide.order,
    }
}

pub fn magazine_to_response(
    magazine: &MagazineEdition,
    config: &AppConfig,
) -> MagazineEditionResponse {
    MagazineEditionResponse {
        id: magazine.id,
        title: magazine.title.clone(),
        title_fr: magazine.title_fr.clone(),
        description: magazine.description.clone(),
        description_fr: magazine.description_fr.clone(),
        cover_image: media_url(&magazine.cover_image, config),
        pdf_file: media_url(&magazine.pdf_file, config),
        publish_date: magazine.publish_date,
        is_featured: magazine.is_featured,
    }
}

pub fn article_to_response(article: &Article, config: &AppConfig) -> ArticleResponse {
    ArticleResponse {
        id: article.id,
        title: article.title.clone(),
        title_fr: article.title_fr.clone(),
        content: article.content.clone(),
        content_fr: article.content_fr.clone(),
        image: media_url(&article.image, config),
        author: article.author.clone(),
        category: article.category,
        category_display: article.category.label().to_string(),
        publish_date: article.publish_date,
        is_featured: article.is_featured,
    }
}

pub fn embassy_to_response(
    embassy: &EmbassyLocation,
    config: &AppConfig,
) -> EmbassyLocationResponse {
    EmbassyLocationResponse {
        id: embassy.id,
        name: embassy.name.clone(),
        name_fr: embassy.name_fr.clone(),
        address: embassy.address.clone(),
        city: embassy.city.clone(),
        country: embassy.country.clone(),
        latitude: embassy.latitude,
        longitude: embassy.longitude,
        phone_number: embassy.phone_number.clone(),
        email: embassy.email.clone(),
        website: embassy.website.clone(),
        opening_hours: embassy.opening_hours.clone(),
        location_type: embassy.location_type,
        type_display: embassy.location_type.label().to_string(),
        image: media_url(&embassy.image, config),
    }
}

pub fn event_to_response(event: &Event, config: &AppConfig) -> EventResponse {
    EventResponse {
        id: event.id,
        name: event.name.clone(),
        name_fr: event.name_fr.clone(),
        description: event.description.clone(),
        description_fr: event.description_fr.clone(),
        address: event.address.clone(),
        latitude: event.latitude,
        longitude: event.longitude,
        event_date: event.event_date,
        image: media_url(&event.image, config),
    }
}

pub fn live_feed_to_response(feed: &LiveFeed, config: &AppConfig) -> LiveFeedResponse {
    LiveFeedResponse {
        id: feed.id,
        title: feed.title.clone(),
        title_fr: feed.title_fr.clone(),
        stream_url: feed.stream_url.clone(),
        thumbnail: media_url(&feed.thumbnail, config),
        status: feed.status,
        status_display: feed.status.label().to_string(),
        viewer_count: feed.viewer_count,
        duration: feed.duration.clone(),
        scheduled_time: feed.scheduled_time,
    }
}

pub fn resource_to_response(resource: &Resource, config: &AppConfig) -> ResourceResponse {
    ResourceResponse {
        id: resource.id,
        title: resource.title.clone(),
        title_fr: resource.title_fr.clone(),
        category: resource.category,
        category_display: resource.category.label().to_string(),
        file: media_url(&resource.file, config),
        file_size: resource.file_size.clone(),
        file_type: resource.file_type,
        file_type_display: resource.file_type.label().to_string(),
    }
}

pub fn emergency_contact_to_response(
    contact: &EmergencyContact,
    _config: &AppConfig,
) -> EmergencyContactResponse {
    EmergencyContactResponse {
        id: contact.id,
        name: contact.name.clone(),
        name_fr: contact.name_fr.clone(),
        phone_number: contact.phone_number.clone(),
        contact_type: contact.contact_type,
        type_display: contact.contact_type.label().to_string(),
        order: contact.order,
    }
}

pub fn feature_card_to_response(card: &FeatureCard, config: &AppConfig) -> FeatureCardResponse {
    FeatureCardResponse {
        id: card.id,
        title: card.title.clone(),
        title_fr: card.title_fr.clone(),
        description: card.description.clone(),
        description_fr: card.description_fr.clone(),
        image: media_url(&card.image, config),
        gradient_start: card.gradient_start.clone(),
        gradient_end: card.gradient_end.clone(),
        order: card.order,
    }
}

pub fn settings_to_response(settings: Option<&AppSettings>) -> SettingsBody {
    match settings {
        Some(settings) => SettingsBody::Present(AppSettingsResponse {
            summit_year: settings.summit_year.clone(),
            summit_theme: settings.summit_theme.clone(),
            summit_theme_fr: settings.summit_theme_fr.clone(),
            website_url: settings.website_url.clone(),
            facebook_url: settings.facebook_url.clone(),
            twitter_url: settings.twitter_url.clone(),
            instagram_url: settings.instagram_url.clone(),
        }),
        None => SettingsBody::Empty {},
    }
}

pub fn user_to_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.first_name.clone(),
        email: user.email.clone(),
    }
}
