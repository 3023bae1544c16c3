//! Database tests

use super::*;
use chrono::{Duration, Utc};
use tempfile::TempDir;

use crate::error::AppError;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

async fn insert_article(db: &Database, title: &str, category: &str, featured: bool, days_ago: i64) {
    sqlx::query(
        r#"
        INSERT INTO articles (title, content, author, category, publish_date, is_featured, created_at)
        VALUES (?, 'Body', 'Press Office', ?, ?, ?, ?)
        "#,
    )
    .bind(title)
    .bind(category)
    .bind(Utc::now() - Duration::days(days_ago))
    .bind(featured)
    .bind(Utc::now())
    .execute(db.pool())
    .await
    .unwrap();
}

async fn insert_hero_slide(db: &Database, label: &str, order: i64, active: bool) {
    sqlx::query(
        r#"
        INSERT INTO hero_slides (image, label, "order", is_active, created_at)
        VALUES ('hero_slides/banner.jpg', ?, ?, ?, ?)
        "#,
    )
    .bind(label)
    .bind(order)
    .bind(active)
    .bind(Utc::now())
    .execute(db.pool())
    .await
    .unwrap();
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        first_name: "Amani".to_string(),
        date_joined: Utc::now(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_hero_slides_exclude_inactive_and_follow_order() {
    let (db, _temp_dir) = create_test_db().await;
    insert_hero_slide(&db, "second", 2, true).await;
    insert_hero_slide(&db, "hidden", 0, false).await;
    insert_hero_slide(&db, "first", 1, true).await;
    insert_hero_slide(&db, "first-tie", 1, true).await;

    let slides = db.list_hero_slides().await.unwrap();
    let labels: Vec<&str> = slides.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["first", "first-tie", "second"]);

    let hidden_id: i64 = sqlx::query_scalar("SELECT id FROM hero_slides WHERE label = 'hidden'")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert!(db.get_hero_slide(hidden_id).await.unwrap().is_none());
    assert!(db.get_hero_slide(slides[0].id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_article_filters_and_ordering() {
    let (db, _temp_dir) = create_test_db().await;
    insert_article(&db, "old featured", "politics", true, 10).await;
    insert_article(&db, "new featured", "economy", true, 1).await;
    insert_article(&db, "plain", "politics", false, 5).await;

    let featured = db
        .list_articles(
            &[ColumnFilter::bool("is_featured", true)],
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(featured.count, 2);
    let titles: Vec<&str> = featured.items.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["new featured", "old featured"]);

    let politics = db
        .list_articles(
            &[ColumnFilter::text("category", ArticleCategory::Politics.as_str())],
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(politics.count, 2);
    assert!(
        politics
            .items
            .iter()
            .all(|a| a.category == ArticleCategory::Politics)
    );
}

#[tokio::test]
async fn test_pagination_bounds() {
    let (db, _temp_dir) = create_test_db().await;
    for i in 0..25 {
        insert_article(&db, &format!("article {i}"), "culture", false, i).await;
    }

    let first = db
        .list_articles(&[], PageRequest::new(1))
        .await
        .unwrap();
    assert_eq!(first.count, 25);
    assert_eq!(first.items.len(), 20);
    assert!(first.has_next());

    let second = db
        .list_articles(&[], PageRequest::new(2))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert!(!second.has_next());

    let third = db.list_articles(&[], PageRequest::new(3)).await;
    assert!(matches!(third, Err(AppError::InvalidPage)));
}

#[tokio::test]
async fn test_empty_table_first_page_is_valid() {
    let (db, _temp_dir) = create_test_db().await;

    let page = db.list_events(PageRequest::new(1)).await.unwrap();
    assert_eq!(page.count, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_home_feed_limits() {
    let (db, _temp_dir) = create_test_db().await;
    for i in 0..8 {
        insert_article(&db, &format!("featured {i}"), "diplomacy", true, i).await;
    }
    for i in 0..8 {
        insert_article(&db, &format!("plain {i}"), "culture", false, i).await;
    }

    assert_eq!(db.featured_articles(5).await.unwrap().len(), 5);
    assert_eq!(db.recent_articles(10).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_settings_first_row_wins() {
    let (db, _temp_dir) = create_test_db().await;
    assert!(db.get_app_settings().await.unwrap().is_none());

    for theme in ["First theme", "Second theme"] {
        sqlx::query("INSERT INTO app_settings (summit_theme) VALUES (?)")
            .bind(theme)
            .execute(db.pool())
            .await
            .unwrap();
    }

    let settings = db.get_app_settings().await.unwrap().unwrap();
    assert_eq!(settings.summit_theme, "First theme");
    assert_eq!(settings.summit_year, "2026");
    assert_eq!(settings.summit_theme_fr, "");
}

#[tokio::test]
async fn test_user_crud() {
    let (db, _temp_dir) = create_test_db().await;

    let user = db.insert_user(&new_user("amani@example.com")).await.unwrap();
    assert_eq!(user.username, "amani@example.com");
    assert!(user.is_active);
    assert!(user.last_login.is_none());

    let by_email = db.get_user_by_email("amani@example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));
    assert!(db.email_exists("amani@example.com").await.unwrap());

    db.record_login(user.id, Utc::now()).await.unwrap();
    assert!(db.get_user(user.id).await.unwrap().unwrap().last_login.is_some());

    let updated = db
        .update_user_profile(user.id, "Amani N.", "amani.n@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Amani N.");
    assert_eq!(updated.username, "amani.n@example.com");

    assert!(db.delete_user(user.id).await.unwrap());
    assert!(db.get_user(user.id).await.unwrap().is_none());
    assert!(!db.delete_user(user.id).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_email_is_validation_error() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_user(&new_user("dup@example.com")).await.unwrap();

    let error = db
        .insert_user(&new_user("dup@example.com"))
        .await
        .expect_err("unique index must reject the second insert");
    match error {
        AppError::Validation(fields) => {
            assert_eq!(
                fields.get("email"),
                Some(&[DUPLICATE_EMAIL_MESSAGE.to_string()][..])
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_updating_to_taken_email_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_user(&new_user("taken@example.com")).await.unwrap();
    let other = db.insert_user(&new_user("other@example.com")).await.unwrap();

    let result = db
        .update_user_profile(other.id, "Other", "taken@example.com")
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
