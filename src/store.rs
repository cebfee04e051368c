use crate::model::{Education, Experience, NewShareLink, Profile, ShareLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The generated token already exists.
    #[error("share link token already exists")]
    UniqueViolation,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence of share links. Every mutation is a single conditional update.
#[async_trait]
pub trait ShareLinkStore: Send + Sync {
    async fn insert(&self, link: &NewShareLink) -> Result<ShareLink, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>, StoreError>;

    /// Newest first.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShareLink>, StoreError>;

    /// Flips every active link with `expires_at <= now` to expired and returns
    /// the number of rows touched.
    async fn expire_active(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Marks the link revoked when it belongs to `owner_id`, whatever its
    /// current status. Returns the number of rows touched.
    async fn revoke(&self, link_id: Uuid, owner_id: Uuid) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, owner_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Sorted by start date, most recent first.
    async fn get_education(&self, owner_id: Uuid) -> Result<Vec<Education>, StoreError>;

    /// Sorted by start date, most recent first.
    async fn get_experience(&self, owner_id: Uuid) -> Result<Vec<Experience>, StoreError>;

    async fn find_by_api_key_hash(&self, api_key_hash: &str)
        -> Result<Option<Profile>, StoreError>;
}
