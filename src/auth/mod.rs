//! Bearer token authentication
//!
//! Handles:
//! - Password hashing and strength policy
//! - Access/refresh token issuing and verification
//! - Authentication extractor

mod middleware;
pub mod password;
pub mod token;

pub use middleware::{CurrentUser, access_token_user_id, extract_bearer_token};
pub use token::{Claims, TokenPair, TokenType, issue_tokens, sign_token, verify_token};
