//! Home feed service
//!
//! Composes the landing screen payload from the individual content tables.

use std::sync::Arc;

use crate::data::{AppSettings, Article, Database, FeatureCard, HeroSlide};
use crate::error::AppError;

/// Featured articles shown on the home screen
pub const FEATURED_ARTICLES_LIMIT: i64 = 5;
/// Latest articles shown on the home screen, featured or not
pub const RECENT_ARTICLES_LIMIT: i64 = 10;

/// Everything the landing screen needs in one round trip
#[derive(Debug, Clone)]
pub struct HomeFeed {
    pub hero_slides: Vec<HeroSlide>,
    pub featured_articles: Vec<Article>,
    pub articles: Vec<Article>,
    pub feature_cards: Vec<FeatureCard>,
    pub settings: Option<AppSettings>,
}

pub struct FeedService {
    db: Arc<Database>,
}

impl FeedService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Load the home feed
    ///
    /// Each section uses the same ordering and visibility rules as its
    /// standalone list endpoint.
    pub async fn home_feed(&self) -> Result<HomeFeed, AppError> {
        let (hero_slides, featured_articles, articles, feature_cards, settings) = tokio::try_join!(
            self.db.list_hero_slides(),
            self.db.featured_articles(FEATURED_ARTICLES_LIMIT),
            self.db.recent_articles(RECENT_ARTICLES_LIMIT),
            self.db.list_feature_cards(),
            self.db.get_app_settings(),
        )?;

        Ok(HomeFeed {
            hero_slides,
            featured_articles,
            articles,
            feature_cards,
            settings,
        })
    }
}
