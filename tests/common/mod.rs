//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::net::SocketAddr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use summit_cms::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const STRONG_PASSWORD: &str = "Summit-Gitega-2026!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_rate_limit(config::RateLimitConfig::default()).await
    }

    /// Create a test server with custom request quotas
    pub async fn with_rate_limit(rate_limit: config::RateLimitConfig) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Bind first so pagination links carry the real address
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                domain: addr.to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig { path: db_path },
            storage: config::StorageConfig {
                media: config::MediaStorageConfig {
                    public_url: "https://media.test.example.com".to_string(),
                },
            },
            auth: config::AuthConfig {
                token_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                access_token_lifetime: 604_800,
                refresh_token_lifetime: 2_592_000,
                rotate_refresh_tokens: true,
            },
            instance: config::InstanceConfig {
                title: "Test Summit".to_string(),
                contact_email: "support@test.example.com".to_string(),
            },
            cors: config::CorsConfig::default(),
            rate_limit,
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let app = summit_cms::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            addr: format!("http://{}", addr),
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn get_authed(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_json(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Register a user through the API and return the response body
    pub async fn register(&self, name: &str, email: &str) -> Value {
        let response = self
            .post_json(
                "/api/auth/register/",
                json!({"name": name, "email": email, "password": STRONG_PASSWORD}),
            )
            .await;
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    // =========================================================================
    // Content fixtures (the administrative console owns these tables)
    // =========================================================================

    pub async fn insert_article(
        &self,
        title: &str,
        category: &str,
        featured: bool,
        published: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO articles (title, content, image, author, category, publish_date, is_featured, created_at)
            VALUES (?, 'Body', 'articles/cover.jpg', 'Press Office', ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(category)
        .bind(published)
        .bind(featured)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_hero_slide(&self, label: &str, order: i64, active: bool) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO hero_slides (image, label, "order", is_active, created_at)
            VALUES ('hero_slides/banner.jpg', ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(label)
        .bind(order)
        .bind(active)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_feature_card(&self, title: &str, order: i64, active: bool) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO feature_cards (title, description, image, gradient_start, gradient_end, "order", is_active, created_at)
            VALUES (?, 'Card', '', '#1EB53A', '#CE1126', ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(order)
        .bind(active)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_event(&self, name: &str, date: DateTime<Utc>) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO events (name, description, address, latitude, longitude, event_date, image, created_at)
            VALUES (?, 'Session', 'Kigobe, Bujumbura', -3.36, 29.36, ?, '', ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(date)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_resource(&self, title: &str, category: &str, file_type: &str) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO resources (title, category, file, file_size, file_type, created_at)
            VALUES (?, ?, 'resources/doc.pdf', '2.4 MB', ?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(category)
        .bind(file_type)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_magazine(&self, title: &str, published: NaiveDate) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO magazine_editions (title, description, cover_image, publish_date, is_featured, created_at)
            VALUES (?, 'Edition', 'magazines/cover.jpg', ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(published)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_embassy(
        &self,
        name: &str,
        country: &str,
        city: &str,
        location_type: &str,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO embassy_locations (name, address, city, country, latitude, longitude, type, created_at)
            VALUES (?, 'Main Street 1', ?, ?, 0.0, 0.0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(city)
        .bind(country)
        .bind(location_type)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_live_feed(
        &self,
        title: &str,
        status: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO live_feeds (title, stream_url, status, created_at)
            VALUES (?, 'https://stream.example/live', ?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(status)
        .bind(created_at)
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_emergency_contact(
        &self,
        name: &str,
        contact_type: &str,
        order: i64,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO emergency_contacts (name, phone_number, type, "order", created_at)
            VALUES (?, '+257 22 00 00 00', ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(contact_type)
        .bind(order)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap()
    }

    pub async fn insert_settings(&self, theme: &str) {
        sqlx::query(
            "INSERT INTO app_settings (summit_year, summit_theme, website_url) VALUES ('2026', ?, 'https://summit.example')",
        )
        .bind(theme)
        .execute(self.state.db.pool())
        .await
        .unwrap();
    }
}
