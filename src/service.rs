use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{NewShareLink, ShareDuration, ShareLink};
use crate::store::{ShareLinkStore, StoreError};
use crate::utils::generate_token;
use std::sync::Arc;
use uuid::Uuid;

const INSERT_ATTEMPTS: usize = 2;

/// Creates, lists, expires and revokes share links.
#[derive(Clone)]
pub struct ShareLinkService {
    store: Arc<dyn ShareLinkStore>,
    clock: Arc<dyn Clock>,
}

impl ShareLinkService {
    pub fn new(store: Arc<dyn ShareLinkStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persists a fresh active link valid for `days` (1 or 2). A token
    /// collision is retried once with a new token.
    pub async fn create_link(&self, owner_id: Uuid, days: i64) -> Result<ShareLink, AppError> {
        let duration = ShareDuration::try_from(days)?;
        self.expire_sweep().await?;

        for attempt in 1..=INSERT_ATTEMPTS {
            let now = self.clock.now();
            let new_link = NewShareLink {
                owner_id,
                token: generate_token(),
                created_at: now,
                expires_at: now + duration.as_duration(),
            };
            match self.store.insert(&new_link).await {
                Ok(link) => {
                    tracing::info!(
                        owner_id = %owner_id,
                        link_id = %link.id,
                        expires_at = %link.expires_at,
                        "Share link created"
                    );
                    return Ok(link);
                }
                Err(StoreError::UniqueViolation) if attempt < INSERT_ATTEMPTS => {
                    tracing::warn!(owner_id = %owner_id, "Share link token collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(StoreError::UniqueViolation.into())
    }

    /// Marks every active link whose expiry has passed as expired.
    pub async fn expire_sweep(&self) -> Result<u64, AppError> {
        let expired = self.store.expire_active(self.clock.now()).await?;
        tracing::debug!(expired, "Expiry sweep finished");
        Ok(expired)
    }

    pub async fn list_links(&self, owner_id: Uuid) -> Result<Vec<ShareLink>, AppError> {
        self.expire_sweep().await?;
        Ok(self.store.find_by_owner(owner_id).await?)
    }

    /// Links owned by someone else are left untouched and the caller gets the
    /// same outcome either way.
    pub async fn revoke(&self, link_id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let updated = self.store.revoke(link_id, owner_id).await?;
        if updated > 0 {
            tracing::info!(owner_id = %owner_id, link_id = %link_id, "Share link revoked");
        } else {
            tracing::debug!(owner_id = %owner_id, link_id = %link_id, "Revoke matched no link");
        }
        Ok(())
    }
}
