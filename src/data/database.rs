//! SQLite database operations
//!
//! All database access goes through this module.
//! Content tables are read-only from this service's point of view;
//! the `users` table is the only one written here.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Instant;

use super::models::*;
use crate::error::AppError;
use crate::metrics::observe_db_query;

/// Value of an exact-match column filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// `column = value` condition applied to a list query
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: &'static str,
    pub value: FilterValue,
}

impl ColumnFilter {
    pub fn text(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: FilterValue::Text(value.into()),
        }
    }

    pub fn bool(column: &'static str, value: bool) -> Self {
        Self {
            column,
            value: FilterValue::Bool(value),
        }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[ColumnFilter]) {
    let mut first = true;
    for filter in filters {
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
        builder.push(filter.column).push(" = ");
        match &filter.value {
            FilterValue::Text(value) => builder.push_bind(value.clone()),
            FilterValue::Bool(value) => builder.push_bind(*value),
        };
    }
}

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Underlying pool, for the administrative tooling that writes content.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Generic content reads
    // =========================================================================

    async fn fetch_all<T>(
        &self,
        table: &'static str,
        filters: &[ColumnFilter],
        order_by: &'static str,
        limit: Option<i64>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        builder.push(table);
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY ").push(order_by);
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        observe_db_query("select", table, started.elapsed());
        Ok(rows)
    }

    async fn fetch_page<T>(
        &self,
        table: &'static str,
        filters: &[ColumnFilter],
        order_by: &'static str,
        page: PageRequest,
    ) -> Result<Page<T>, AppError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        count_builder.push(table);
        push_filters(&mut count_builder, filters);
        let count: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let page = page.resolve(count)?;

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        builder.push(table);
        push_filters(&mut builder, filters);
        builder
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(i64::from(page.size))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        observe_db_query("select_page", table, started.elapsed());

        Ok(Page {
            count,
            number: page.number,
            size: page.size,
            items,
        })
    }

    async fn fetch_by_id<T>(
        &self,
        table: &'static str,
        id: i64,
        active_only: bool,
    ) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        builder.push(table).push(" WHERE id = ").push_bind(id);
        if active_only {
            builder.push(" AND is_active = 1");
        }

        let row = builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?;
        observe_db_query("select_one", table, started.elapsed());
        Ok(row)
    }

    // =========================================================================
    // Hero slides / feature cards (active only, unpaginated)
    // =========================================================================

    pub async fn list_hero_slides(&self) -> Result<Vec<HeroSlide>, AppError> {
        self.fetch_all(
            "hero_slides",
            &[ColumnFilter::bool("is_active", true)],
            "\"order\" ASC, id ASC",
            None,
        )
        .await
    }

    pub async fn get_hero_slide(&self, id: i64) -> Result<Option<HeroSlide>, AppError> {
        self.fetch_by_id("hero_slides", id, true).await
    }

    pub async fn list_feature_cards(&self) -> Result<Vec<FeatureCard>, AppError> {
        self.fetch_all(
            "feature_cards",
            &[ColumnFilter::bool("is_active", true)],
            "\"order\" ASC, id ASC",
            None,
        )
        .await
    }

    pub async fn get_feature_card(&self, id: i64) -> Result<Option<FeatureCard>, AppError> {
        self.fetch_by_id("feature_cards", id, true).await
    }

    // =========================================================================
    // Emergency contacts (unpaginated)
    // =========================================================================

    pub async fn list_emergency_contacts(&self) -> Result<Vec<EmergencyContact>, AppError> {
        self.fetch_all("emergency_contacts", &[], "\"order\" ASC, id ASC", None)
            .await
    }

    pub async fn get_emergency_contact(
        &self,
        id: i64,
    ) -> Result<Option<EmergencyContact>, AppError> {
        self.fetch_by_id("emergency_contacts", id, false).await
    }

    // =========================================================================
    // Paginated content
    // =========================================================================

    pub async fn list_magazines(
        &self,
        page: PageRequest,
    ) -> Result<Page<MagazineEdition>, AppError> {
        self.fetch_page(
            "magazine_editions",
            &[],
            "publish_date DESC, id ASC",
            page,
        )
        .await
    }

    pub async fn get_magazine(&self, id: i64) -> Result<Option<MagazineEdition>, AppError> {
        self.fetch_by_id("magazine_editions", id, false).await
    }

    /// Articles newest first
    ///
    /// # Arguments
    /// * `filters` - exact matches on `category` / `is_featured`
    pub async fn list_articles(
        &self,
        filters: &[ColumnFilter],
        page: PageRequest,
    ) -> Result<Page<Article>, AppError> {
        self.fetch_page("articles", filters, "publish_date DESC, id ASC", page)
            .await
    }

    pub async fn get_article(&self, id: i64) -> Result<Option<Article>, AppError> {
        self.fetch_by_id("articles", id, false).await
    }

    /// Featured articles for the home feed, newest first
    pub async fn featured_articles(&self, limit: i64) -> Result<Vec<Article>, AppError> {
        self.fetch_all(
            "articles",
            &[ColumnFilter::bool("is_featured", true)],
            "publish_date DESC, id ASC",
            Some(limit),
        )
        .await
    }

    /// Most recent articles regardless of featured flag
    pub async fn recent_articles(&self, limit: i64) -> Result<Vec<Article>, AppError> {
        self.fetch_all("articles", &[], "publish_date DESC, id ASC", Some(limit))
            .await
    }

    pub async fn list_embassies(
        &self,
        filters: &[ColumnFilter],
        page: PageRequest,
    ) -> Result<Page<EmbassyLocation>, AppError> {
        self.fetch_page(
            "embassy_locations",
            filters,
            "country ASC, city ASC, id ASC",
            page,
        )
        .await
    }

    pub async fn get_embassy(&self, id: i64) -> Result<Option<EmbassyLocation>, AppError> {
        self.fetch_by_id("embassy_locations", id, false).await
    }

    pub async fn list_events(&self, page: PageRequest) -> Result<Page<Event>, AppError> {
        self.fetch_page("events", &[], "event_date ASC, id ASC", page)
            .await
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        self.fetch_by_id("events", id, false).await
    }

    pub async fn list_live_feeds(
        &self,
        filters: &[ColumnFilter],
        page: PageRequest,
    ) -> Result<Page<LiveFeed>, AppError> {
        self.fetch_page("live_feeds", filters, "created_at DESC, id DESC", page)
            .await
    }

    pub async fn get_live_feed(&self, id: i64) -> Result<Option<LiveFeed>, AppError> {
        self.fetch_by_id("live_feeds", id, false).await
    }

    pub async fn list_resources(
        &self,
        filters: &[ColumnFilter],
        page: PageRequest,
    ) -> Result<Page<Resource>, AppError> {
        self.fetch_page(
            "resources",
            filters,
            "category ASC, title ASC, id ASC",
            page,
        )
        .await
    }

    pub async fn get_resource(&self, id: i64) -> Result<Option<Resource>, AppError> {
        self.fetch_by_id("resources", id, false).await
    }

    // =========================================================================
    // Settings (first row wins)
    // =========================================================================

    /// Get the authoritative settings row
    ///
    /// # Returns
    /// The lowest-id row, or None when the table is empty
    pub async fn get_app_settings(&self) -> Result<Option<AppSettings>, AppError> {
        let settings =
            sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings ORDER BY id ASC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(settings)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user keyed by email
    ///
    /// The unique index on `email` decides concurrent registrations;
    /// the loser gets a validation error.
    pub async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, email, password_hash, first_name, last_name,
                is_active, is_staff, date_joined, last_login
            ) VALUES (?, ?, ?, ?, '', 1, 0, ?, NULL)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(user.date_joined)
        .fetch_one(&self.pool)
        .await;
        observe_db_query("insert", "users", started.elapsed());

        result.map_err(map_duplicate_email)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists > 0)
    }

    /// Update name and login identity of one user.
    ///
    /// # Returns
    /// The updated row, or None if the user no longer exists.
    pub async fn update_user_profile(
        &self,
        id: i64,
        first_name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = ?, email = ?, username = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(first_name)
        .bind(email)
        .bind(email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        observe_db_query("update", "users", started.elapsed());

        result.map_err(map_duplicate_email)
    }

    pub async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a user; owned rows go with it through `ON DELETE CASCADE`.
    ///
    /// # Returns
    /// `true` if a row was deleted
    pub async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        observe_db_query("delete", "users", started.elapsed());

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn map_duplicate_email(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            AppError::validation("email", DUPLICATE_EMAIL_MESSAGE)
        }
        _ => AppError::Database(error),
    }
}

pub const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists.";
