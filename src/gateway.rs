use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{PublicProfile, PublicProfileView};
use crate::store::{ProfileStore, ShareLinkStore};
use std::sync::Arc;

/// Turns an untrusted share token into the owner's read-only profile.
#[derive(Clone)]
pub struct PublicAccessGateway {
    links: Arc<dyn ShareLinkStore>,
    profiles: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
}

impl PublicAccessGateway {
    pub fn new(
        links: Arc<dyn ShareLinkStore>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            links,
            profiles,
            clock,
        }
    }

    /// Unknown, revoked and expired tokens all fail with the same
    /// [`AppError::NotFound`]. Expiry is checked against the clock, so a
    /// sweep that has not run yet never widens the validity window.
    pub async fn resolve(&self, token: &str) -> Result<PublicProfileView, AppError> {
        let link = self
            .links
            .find_by_token(token)
            .await?
            .filter(|link| link.is_usable_at(self.clock.now()))
            .ok_or(AppError::NotFound)?;

        let profile = self
            .profiles
            .get_profile(link.owner_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let education = self.profiles.get_education(link.owner_id).await?;
        let experience = self.profiles.get_experience(link.owner_id).await?;

        Ok(PublicProfileView {
            profile: PublicProfile::from(profile),
            education,
            experience,
        })
    }
}
