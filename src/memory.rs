//! In-process store used by the tests.

use crate::model::{Education, Experience, NewShareLink, Profile, ShareLink, ShareLinkStatus};
use crate::store::{ProfileStore, ShareLinkStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    links: Mutex<Vec<ShareLink>>,
    profiles: Mutex<Vec<(Profile, Option<String>)>>,
    education: Mutex<Vec<Education>>,
    experience: Mutex<Vec<Experience>>,
    forced_collisions: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_profile(&self, profile: Profile, api_key_hash: Option<String>) {
        self.profiles.lock().unwrap().push((profile, api_key_hash));
    }

    pub fn add_education(&self, education: Education) {
        self.education.lock().unwrap().push(education);
    }

    pub fn add_experience(&self, experience: Experience) {
        self.experience.lock().unwrap().push(experience);
    }

    /// Makes the next `count` inserts fail as if the token already existed.
    pub fn force_collisions(&self, count: usize) {
        self.forced_collisions.store(count, Ordering::SeqCst);
    }

    pub fn links(&self) -> Vec<ShareLink> {
        self.links.lock().unwrap().clone()
    }

    /// Deletes the owner together with everything that references it.
    pub fn delete_profile(&self, owner_id: Uuid) {
        self.profiles
            .lock()
            .unwrap()
            .retain(|(profile, _)| profile.id != owner_id);
        self.links
            .lock()
            .unwrap()
            .retain(|link| link.owner_id != owner_id);
        self.education
            .lock()
            .unwrap()
            .retain(|entry| entry.owner_id != owner_id);
        self.experience
            .lock()
            .unwrap()
            .retain(|entry| entry.owner_id != owner_id);
    }
}

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn insert(&self, link: &NewShareLink) -> Result<ShareLink, StoreError> {
        let pending = self.forced_collisions.load(Ordering::SeqCst);
        if pending > 0 {
            self.forced_collisions.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::UniqueViolation);
        }
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|existing| existing.token == link.token) {
            return Err(StoreError::UniqueViolation);
        }
        let created = ShareLink {
            id: Uuid::new_v4(),
            owner_id: link.owner_id,
            token: link.token.clone(),
            created_at: link.created_at,
            expires_at: link.expires_at,
            status: ShareLinkStatus::Active,
        };
        links.push(created.clone());
        Ok(created)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>, StoreError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|link| link.token == token)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShareLink>, StoreError> {
        let mut links: Vec<ShareLink> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|link| link.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn expire_active(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut updated = 0;
        for link in self.links.lock().unwrap().iter_mut() {
            if link.status == ShareLinkStatus::Active && link.expires_at <= now {
                link.status = ShareLinkStatus::Expired;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn revoke(&self, link_id: Uuid, owner_id: Uuid) -> Result<u64, StoreError> {
        let mut updated = 0;
        for link in self.links.lock().unwrap().iter_mut() {
            if link.id == link_id && link.owner_id == owner_id {
                link.status = ShareLinkStatus::Revoked;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, owner_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|(profile, _)| profile.id == owner_id)
            .map(|(profile, _)| profile.clone()))
    }

    async fn get_education(&self, owner_id: Uuid) -> Result<Vec<Education>, StoreError> {
        let mut education: Vec<Education> = self
            .education
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .cloned()
            .collect();
        education.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(education)
    }

    async fn get_experience(&self, owner_id: Uuid) -> Result<Vec<Experience>, StoreError> {
        let mut experience: Vec<Experience> = self
            .experience
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .cloned()
            .collect();
        experience.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(experience)
    }

    async fn find_by_api_key_hash(
        &self,
        api_key_hash: &str,
    ) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|(_, hash)| hash.as_deref() == Some(api_key_hash))
            .map(|(profile, _)| profile.clone()))
    }
}

pub mod fixtures {
    use crate::model::{Education, Experience, Profile};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    pub fn profile(username: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            email_verified: true,
            member_id: Some("MBR-1A2B3C4D".into()),
            full_name: Some("Ada Lovelace".into()),
            phone_number: Some("+44 20 7946 0000".into()),
            qualification: Some("MSc Mathematics".into()),
            resume_url: Some("/uploads/resumes/ada.pdf".into()),
            photo_url: None,
            is_blocked: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    pub fn education(owner_id: Uuid, degree: &str, start_year: i32) -> Education {
        Education {
            id: Uuid::new_v4(),
            owner_id,
            kind: "university".into(),
            institution: Some("University of London".into()),
            degree: Some(degree.into()),
            start_date: date(start_year, 9),
            end_date: date(start_year + 3, 6),
        }
    }

    pub fn experience(owner_id: Uuid, title: &str, start_year: i32) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            company: "Analytical Engines Ltd".into(),
            start_date: date(start_year, 1),
            end_date: date(start_year + 1, 12),
            description: None,
            linkedin_url: None,
        }
    }
}
