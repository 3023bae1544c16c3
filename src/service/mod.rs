//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database access, hashing and token issuance.

mod account;
mod feed;

pub use account::{
    AccountInformation, AccountService, DataExportInfo, ExportNotes, ProfileInformation, Session,
    UserDataExport, is_valid_email,
};
pub use feed::{FEATURED_ARTICLES_LIMIT, FeedService, HomeFeed, RECENT_ARTICLES_LIMIT};
