//! Account service
//!
//! Registration, login, token refresh and the self-service account
//! operations of mobile app users.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::password::{self, UserAttributes};
use crate::auth::{TokenPair, TokenType, issue_tokens, verify_token};
use crate::config::AppConfig;
use crate::data::{DUPLICATE_EMAIL_MESSAGE, Database, NewUser, User};
use crate::error::{AppError, FieldErrors};
use crate::metrics::{USERS_TOTAL, record_auth_event};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

/// Trim a submitted text field, recording required/blank errors.
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            None
        }
        Some("") => {
            errors.add(field, BLANK_MESSAGE);
            None
        }
        Some(value) => Some(value.to_string()),
    }
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

fn validated_email(errors: &mut FieldErrors, value: Option<&str>) -> Option<String> {
    let email = required_text(errors, "email", value)?;
    if is_valid_email(&email) {
        Some(email)
    } else {
        errors.add("email", INVALID_EMAIL_MESSAGE);
        None
    }
}

async fn hash_in_background(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

async fn verify_in_background(password: String, hash: Option<String>) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => password::verify_password(&password, &hash),
        None => {
            password::verify_against_dummy(&password);
            Ok(false)
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
}

/// New account plus its first token pair
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Portable snapshot of everything stored about a user
#[derive(Debug, Clone, Serialize)]
pub struct UserDataExport {
    pub account_information: AccountInformation,
    pub profile_information: ProfileInformation,
    pub data_export_info: DataExportInfo,
    pub notes: ExportNotes,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountInformation {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileInformation {
    pub is_active: bool,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataExportInfo {
    pub export_date: DateTime<Utc>,
    pub format: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportNotes {
    pub content_data: String,
    pub deletion: String,
    pub questions: String,
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
    config: Arc<AppConfig>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Create an account and sign it in
    ///
    /// Every field is validated before anything is written so the caller
    /// receives all field errors at once.
    ///
    /// # Errors
    /// `Validation` for missing, malformed or taken values and weak passwords
    pub async fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Session, AppError> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", name);
        let email = validated_email(&mut errors, email);
        if let Some(email) = email.as_deref() {
            if self.db.email_exists(email).await? {
                errors.add("email", DUPLICATE_EMAIL_MESSAGE);
            }
        }

        match password {
            None => errors.add("password", REQUIRED_MESSAGE),
            Some("") => errors.add("password", BLANK_MESSAGE),
            Some(candidate) => {
                let attributes = UserAttributes {
                    username: email.as_deref().unwrap_or_default(),
                    first_name: name.as_deref().unwrap_or_default(),
                    last_name: "",
                    email: email.as_deref().unwrap_or_default(),
                };
                errors.extend(
                    "password",
                    password::validate_password(candidate, &attributes),
                );
            }
        }

        if let Err(error) = errors.into_result() {
            record_auth_event("register", "rejected");
            return Err(error);
        }
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AppError::Internal(anyhow::anyhow!(
                "registration fields missing after validation"
            )));
        };

        let password_hash = hash_in_background(password.to_string()).await?;
        let user = self
            .db
            .insert_user(&NewUser {
                email,
                password_hash,
                first_name: name,
                date_joined: Utc::now(),
            })
            .await
            .inspect_err(|_| record_auth_event("register", "rejected"))?;

        let tokens = issue_tokens(user.id, &self.config.auth, true)?;
        USERS_TOTAL.inc();
        record_auth_event("register", "success");
        tracing::info!(user_id = user.id, "User registered");

        Ok(Session { user, tokens })
    }

    /// Exchange email and password for a token pair
    ///
    /// Unknown emails cost the same hashing work as wrong passwords.
    ///
    /// # Errors
    /// `InvalidCredentials` for either failure, indistinguishably
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self.db.get_user_by_email(email.trim()).await?;
        let hash = user.as_ref().map(|user| user.password_hash.clone());
        let verified = verify_in_background(password.to_string(), hash).await?;

        let user = match user {
            Some(user) if verified && user.is_active => user,
            _ => {
                record_auth_event("login", "failure");
                return Err(AppError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        self.db.record_login(user.id, now).await?;
        let tokens = issue_tokens(user.id, &self.config.auth, true)?;
        record_auth_event("login", "success");
        tracing::debug!(user_id = user.id, "User logged in");

        Ok(Session {
            user: User {
                last_login: Some(now),
                ..user
            },
            tokens,
        })
    }

    /// Trade a refresh token for a new access token
    ///
    /// Issues a fresh refresh token as well when rotation is enabled.
    ///
    /// # Errors
    /// `InvalidToken` for a bad, expired or orphaned refresh token
    pub async fn refresh(&self, refresh: &str) -> Result<TokenPair, AppError> {
        let claims = verify_token(refresh, &self.config.auth.token_secret, TokenType::Refresh)
            .map_err(|_| {
                record_auth_event("refresh", "failure");
                AppError::InvalidToken
            })?;

        match self.db.get_user(claims.user_id).await? {
            Some(user) if user.is_active => {}
            _ => {
                record_auth_event("refresh", "failure");
                return Err(AppError::InvalidToken);
            }
        }

        let tokens = issue_tokens(
            claims.user_id,
            &self.config.auth,
            self.config.auth.rotate_refresh_tokens,
        )?;
        record_auth_event("refresh", "success");
        Ok(tokens)
    }

    /// Partially update name and email
    ///
    /// The username follows the email.
    pub async fn update_profile(
        &self,
        user: &User,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        let mut errors = FieldErrors::new();

        let name = match name {
            Some(value) => required_text(&mut errors, "name", Some(value)),
            None => Some(user.first_name.clone()),
        };
        let email = match email {
            Some(value) => validated_email(&mut errors, Some(value)),
            None => Some(user.email.clone()),
        };
        if let Some(email) = email.as_deref() {
            if email != user.email && self.db.email_exists(email).await? {
                errors.add("email", DUPLICATE_EMAIL_MESSAGE);
            }
        }
        errors.into_result()?;

        let (Some(name), Some(email)) = (name, email) else {
            return Err(AppError::Internal(anyhow::anyhow!(
                "profile fields missing after validation"
            )));
        };

        let updated = self
            .db
            .update_user_profile(user.id, &name, &email)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::debug!(user_id = user.id, "Profile updated");
        Ok(updated)
    }

    /// Permanently delete the user's account
    ///
    /// # Returns
    /// Confirmation message naming the deleted email
    pub async fn delete_account(&self, user: &User) -> Result<String, AppError> {
        if !self.db.delete_user(user.id).await? {
            return Err(AppError::NotFound);
        }

        USERS_TOTAL.dec();
        record_auth_event("delete_account", "success");
        tracing::info!(user_id = user.id, "Account deleted");

        Ok(format!(
            "Account {} has been permanently deleted.",
            user.email
        ))
    }

    /// Compile the data held about `user`
    pub fn export_user_data(&self, user: &User) -> UserDataExport {
        UserDataExport {
            account_information: AccountInformation {
                user_id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                date_joined: user.date_joined,
                last_login: user.last_login,
            },
            profile_information: ProfileInformation {
                is_active: user.is_active,
                is_staff: user.is_staff,
            },
            data_export_info: DataExportInfo {
                export_date: Utc::now(),
                format: "JSON",
                version: "1.0",
            },
            notes: ExportNotes {
                content_data: "This export includes your account information. Content you viewed (articles, magazines, etc.) is not tracked or stored.".to_string(),
                deletion: "To delete your account and all data, use the Delete Account feature in the app.".to_string(),
                questions: format!(
                    "Contact {} for questions about your data.",
                    self.config.instance.contact_email
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::valid_config;
    use tempfile::TempDir;

    const STRONG_PASSWORD: &str = "Summit-Gitega-2026!";

    async fn create_service() -> (AccountService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Arc::new(Database::connect(&db_path).await.unwrap());
        let service = AccountService::new(db.clone(), Arc::new(valid_config()));
        (service, db, temp_dir)
    }

    fn field_errors(error: AppError) -> FieldErrors {
        match error {
            AppError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("amani@example.com"));
        assert!(is_valid_email("first.last+tag@mail.gov.bi"));
        assert!(!is_valid_email("amani"));
        assert!(!is_valid_email("amani@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("am ani@example.com"));
        assert!(!is_valid_email("amani@example..com"));
    }

    #[tokio::test]
    async fn register_creates_user_and_tokens() {
        let (service, db, _temp_dir) = create_service().await;

        let session = service
            .register(Some(" Amani "), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap();
        assert_eq!(session.user.first_name, "Amani");
        assert_eq!(session.user.username, "amani@example.com");
        assert_ne!(session.user.password_hash, STRONG_PASSWORD);
        assert!(session.tokens.refresh.is_some());
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn register_collects_all_field_errors() {
        let (service, db, _temp_dir) = create_service().await;

        let fields = field_errors(
            service
                .register(None, Some("not-an-email"), Some("123"))
                .await
                .unwrap_err(),
        );
        assert_eq!(fields.get("name"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
        assert_eq!(
            fields.get("email"),
            Some(&[INVALID_EMAIL_MESSAGE.to_string()][..])
        );
        let password_errors = fields.get("password").unwrap();
        assert!(password_errors.iter().any(|m| m.contains("too short")));
        assert!(password_errors.iter().any(|m| m.contains("entirely numeric")));
        assert_eq!(db.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let (service, _db, _temp_dir) = create_service().await;
        service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap();

        let fields = field_errors(
            service
                .register(Some("Other"), Some("amani@example.com"), Some(STRONG_PASSWORD))
                .await
                .unwrap_err(),
        );
        assert_eq!(
            fields.get("email"),
            Some(&[DUPLICATE_EMAIL_MESSAGE.to_string()][..])
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (service, db, _temp_dir) = create_service().await;
        let registered = service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap();

        let wrong_password = service
            .login("amani@example.com", "not-the-password")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("nobody@example.com", STRONG_PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());

        let session = service
            .login("amani@example.com", STRONG_PASSWORD)
            .await
            .unwrap();
        assert_eq!(session.user.id, registered.user.id);
        let stored = db.get_user(session.user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_access_tokens() {
        let (service, _db, _temp_dir) = create_service().await;
        let session = service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap();

        let refreshed = service
            .refresh(session.tokens.refresh.as_deref().unwrap())
            .await
            .unwrap();
        assert!(refreshed.refresh.is_some());
        assert_ne!(refreshed.refresh, session.tokens.refresh);

        let error = service.refresh(&session.tokens.access).await.unwrap_err();
        assert!(matches!(error, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn refresh_fails_after_account_deletion() {
        let (service, _db, _temp_dir) = create_service().await;
        let session = service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap();

        service.delete_account(&session.user).await.unwrap();
        let error = service
            .refresh(session.tokens.refresh.as_deref().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn update_profile_is_partial() {
        let (service, _db, _temp_dir) = create_service().await;
        let user = service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap()
            .user;

        let renamed = service
            .update_profile(&user, Some("Amani N."), None)
            .await
            .unwrap();
        assert_eq!(renamed.first_name, "Amani N.");
        assert_eq!(renamed.email, "amani@example.com");

        let moved = service
            .update_profile(&renamed, None, Some("amani.n@example.com"))
            .await
            .unwrap();
        assert_eq!(moved.username, "amani.n@example.com");
        assert_eq!(moved.first_name, "Amani N.");

        let fields = field_errors(
            service
                .update_profile(&moved, Some("  "), Some("bad"))
                .await
                .unwrap_err(),
        );
        assert_eq!(fields.get("name"), Some(&[BLANK_MESSAGE.to_string()][..]));
        assert_eq!(
            fields.get("email"),
            Some(&[INVALID_EMAIL_MESSAGE.to_string()][..])
        );
    }

    #[tokio::test]
    async fn delete_and_export() {
        let (service, db, _temp_dir) = create_service().await;
        let user = service
            .register(Some("Amani"), Some("amani@example.com"), Some(STRONG_PASSWORD))
            .await
            .unwrap()
            .user;

        let export = service.export_user_data(&user);
        assert_eq!(export.account_information.user_id, user.id);
        assert_eq!(export.data_export_info.format, "JSON");
        assert!(export.notes.questions.contains("@"));

        let message = service.delete_account(&user).await.unwrap();
        assert_eq!(
            message,
            "Account amani@example.com has been permanently deleted."
        );
        assert!(db.get_user(user.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete_account(&user).await,
            Err(AppError::NotFound)
        ));
    }
}
