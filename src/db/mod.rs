/// Profile store abstraction
///
/// The service only ever reads user documents, either directly by id or by an
/// email equality query taking the first match. Keeping that capability behind
/// a trait lets tests substitute an in-memory store for MongoDB.
use crate::{error::AppResult, models::UserProfile};

pub mod mongo;

pub use mongo::MongoProfileStore;

/// Read-only access to the `users` collection
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user document by its store key
    async fn get_by_id(&self, id: &str) -> AppResult<Option<UserProfile>>;

    /// Fetch the first user document whose email equals `email` exactly
    ///
    /// Callers are expected to normalize the email (trim, lowercase) before
    /// querying; the store compares against the stored value verbatim.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
}
