use mongodb::{bson::doc, Client as MongoClient, Collection};

use crate::{
    db::ProfileStore,
    error::AppResult,
    models::UserProfile,
};

const USERS_COLLECTION: &str = "users";

/// MongoDB-backed profile store
#[derive(Clone)]
pub struct MongoProfileStore {
    users: Collection<UserProfile>,
}

impl MongoProfileStore {
    /// Connect to MongoDB and bind the `users` collection
    pub async fn connect(uri: &str, database: &str) -> AppResult<Self> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await?;
        let users = client.database(database).collection(USERS_COLLECTION);
        Ok(Self { users })
    }
}

#[async_trait::async_trait]
impl ProfileStore for MongoProfileStore {
    async fn get_by_id(&self, id: &str) -> AppResult<Option<UserProfile>> {
        let profile = self.users.find_one(doc! { "_id": id }, None).await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let profile = self.users.find_one(doc! { "email": email }, None).await?;
        Ok(profile)
    }
}
