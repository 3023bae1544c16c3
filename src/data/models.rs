//! Data models
//!
//! Rust structs representing database rows. Content rows are written by the
//! administrative console; only `User` is created and mutated by this service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// Choice fields
// =============================================================================

/// Raised when a stored or requested value is not one of an enum's choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Select a valid choice. {} is not one of the available choices.",
            self.0
        )
    }
}

impl std::error::Error for UnknownChoice {}

/// Badge colour for values without a dedicated entry.
pub const DEFAULT_BADGE_COLOR: &str = "#6c757d";

/// Declares a choice enum together with its lookup table:
/// stored value, display label and console badge colour.
///
/// The API projects only the label. `ALL` and `badge_color` are the
/// public table the administrative console renders its badges from.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($value:literal, $label:literal, $color:expr)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                #[sqlx(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Value as stored in the database and accepted in query filters
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Human readable label
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Hex colour used when rendering this value as a badge
            pub fn badge_color(&self) -> &'static str {
                match self {
                    $(Self::$variant => $color,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(UnknownChoice(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Editorial category of an article
    ArticleCategory {
        Politics => ("politics", "Politics", "#CE1126"),
        Economy => ("economy", "Economy", "#17a2b8"),
        Culture => ("culture", "Culture", "#D4AF37"),
        Diplomacy => ("diplomacy", "Diplomacy", DEFAULT_BADGE_COLOR),
    }
}

choice_enum! {
    /// Kind of embassy location
    LocationType {
        Embassy => ("embassy", "Embassy", "#1EB53A"),
        Consulate => ("consulate", "Consulate", "#D4AF37"),
        EventVenue => ("event_venue", "Event Venue", DEFAULT_BADGE_COLOR),
        Office => ("office", "Office", DEFAULT_BADGE_COLOR),
    }
}

choice_enum! {
    LiveFeedStatus {
        Live => ("live", "Live", "#CE1126"),
        Upcoming => ("upcoming", "Upcoming", "#D4AF37"),
        Recorded => ("recorded", "Recorded", DEFAULT_BADGE_COLOR),
    }
}

choice_enum! {
    ResourceCategory {
        OfficialDocuments => ("official_documents", "Official Documents", "#1EB53A"),
        CountryInfo => ("country_info", "Country Information", "#D4AF37"),
        Media => ("media", "Media Resources", "#CE1126"),
        Reference => ("reference", "Reference Guides", "#17a2b8"),
    }
}

choice_enum! {
    FileType {
        Pdf => ("pdf", "PDF", "#CE1126"),
        Zip => ("zip", "ZIP", "#D4AF37"),
    }
}

choice_enum! {
    ContactType {
        Embassy => ("embassy", "Embassy", "#1EB53A"),
        Police => ("police", "Police", "#17a2b8"),
        Ambulance => ("ambulance", "Ambulance", "#CE1126"),
        Fire => ("fire", "Fire Department", "#D4AF37"),
    }
}

// =============================================================================
// Content
// =============================================================================

/// Landing screen banner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HeroSlide {
    pub id: i64,
    /// Media path of the banner image
    pub image: String,
    pub label: String,
    pub label_fr: String,
    pub order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MagazineEdition {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub description: String,
    pub description_fr: String,
    pub cover_image: String,
    /// Empty when no PDF was uploaded
    pub pdf_file: String,
    pub publish_date: NaiveDate,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub content: String,
    pub content_fr: String,
    pub image: String,
    pub author: String,
    pub category: ArticleCategory,
    pub publish_date: DateTime<Utc>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmbassyLocation {
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
    #[sqlx(rename = "type")]
    pub location_type: LocationType,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub name_fr: String,
    pub description: String,
    pub description_fr: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub event_date: DateTime<Utc>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Live stream metadata
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LiveFeed {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub stream_url: String,
    pub thumbnail: String,
    pub status: LiveFeedStatus,
    pub viewer_count: i64,
    /// Free-form display string, e.g. "1h 30m"
    pub duration: String,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Downloadable document
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub category: ResourceCategory,
    pub file: String,
    /// Display string, e.g. "2.4 MB"
    pub file_size: String,
    pub file_type: FileType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmergencyContact {
    pub id: i64,
    pub name: String,
    pub name_fr: String,
    pub phone_number: String,
    #[sqlx(rename = "type")]
    pub contact_type: ContactType,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeatureCard {
    pub id: i64,
    pub title: String,
    pub title_fr: String,
    pub description: String,
    pub description_fr: String,
    pub image: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// App-wide settings. Several rows may exist; the first by id wins.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppSettings {
    pub id: i64,
    pub summit_year: String,
    pub summit_theme: String,
    pub summit_theme_fr: String,
    pub website_url: String,
    pub facebook_url: String,
    pub twitter_url: String,
    pub instagram_url: String,
}

// =============================================================================
// Users
// =============================================================================

/// Registered mobile app user. The email doubles as the username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Values for a user row about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub date_joined: DateTime<Utc>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Requested 1-based page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
    /// Resolve to the final page once the row count is known
    pub last: bool,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(number: u32) -> Self {
        Self {
            number: number.max(1),
            size: Self::DEFAULT_SIZE,
            last: false,
        }
    }

    /// `?page=last`
    pub fn last() -> Self {
        Self {
            last: true,
            ..Self::new(1)
        }
    }

    /// Concrete page number for a result set of `count` rows
    pub fn resolve(self, count: i64) -> Result<Self, AppError> {
        let total_pages = num_pages(count, self.size);
        let number = if self.last { total_pages } else { self.number };
        if number > total_pages {
            return Err(AppError::InvalidPage);
        }
        Ok(Self {
            number,
            last: false,
            ..self
        })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One page of rows plus the total row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub count: i64,
    pub number: u32,
    pub size: u32,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Number of pages; an empty result still has one page.
    pub fn num_pages(&self) -> u32 {
        num_pages(self.count, self.size)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

pub(crate) fn num_pages(count: i64, size: u32) -> u32 {
    let size = i64::from(size.max(1));
    let pages = (count.max(0) + size - 1) / size;
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_round_trip_through_from_str() {
        for category in ArticleCategory::ALL {
            assert_eq!(category.as_str().parse::<ArticleCategory>(), Ok(*category));
        }
        assert_eq!(
            "event_venue".parse::<LocationType>(),
            Ok(LocationType::EventVenue)
        );
        assert_eq!(
            "official_documents".parse::<ResourceCategory>(),
            Ok(ResourceCategory::OfficialDocuments)
        );
    }

    #[test]
    fn unknown_choice_reports_value() {
        let error = "news".parse::<ArticleCategory>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Select a valid choice. news is not one of the available choices."
        );
    }

    #[test]
    fn badge_lookup_falls_back_to_default_colour() {
        assert_eq!(ArticleCategory::Politics.badge_color(), "#CE1126");
        assert_eq!(ArticleCategory::Diplomacy.badge_color(), DEFAULT_BADGE_COLOR);
        assert_eq!(ContactType::Fire.label(), "Fire Department");
        assert_eq!(FileType::Zip.badge_color(), "#D4AF37");
    }

    #[test]
    fn choices_serialize_as_stored_value() {
        assert_eq!(
            serde_json::to_string(&ResourceCategory::CountryInfo).unwrap(),
            "\"country_info\""
        );
    }

    #[test]
    fn page_counts() {
        assert_eq!(num_pages(0, 20), 1);
        assert_eq!(num_pages(20, 20), 1);
        assert_eq!(num_pages(21, 20), 2);

        let page = Page {
            count: 45,
            number: 2,
            size: 20,
            items: vec![0u8; 20],
        };
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(page.num_pages(), 3);
        assert_eq!(PageRequest::new(3).offset(), 40);
        assert_eq!(PageRequest::new(0).number, 1);
        assert_eq!(PageRequest::last().resolve(45).unwrap(), PageRequest::new(3));
        assert_eq!(PageRequest::last().resolve(0).unwrap(), PageRequest::new(1));
        assert!(matches!(
            PageRequest::new(4).resolve(45),
            Err(AppError::InvalidPage)
        ));
    }
}
