use crate::model::{Education, Experience, NewShareLink, Profile, ShareLink};
use crate::store::{ProfileStore, ShareLinkStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{Error, Pool, Postgres};
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, username, email, email_verified, member_id, full_name, \
     phone_number, qualification, resume_url, photo_url, is_blocked, created_at";

#[derive(Clone)]
pub struct PgStore {
    db_connection_pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(db_connection_pool: Pool<Postgres>) -> Self {
        Self { db_connection_pool }
    }
}

fn map_insert_error(err: Error) -> StoreError {
    match err {
        Error::Database(db_err) if db_err.kind() == ErrorKind::UniqueViolation => {
            StoreError::UniqueViolation
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl ShareLinkStore for PgStore {
    async fn insert(&self, link: &NewShareLink) -> Result<ShareLink, StoreError> {
        sqlx::query_as(
            r#"
              insert into share_links(owner_id, token, created_at, expires_at, status)
              values ($1, $2, $3, $4, 'active')
              returning id, owner_id, token, created_at, expires_at, status
            "#,
        )
        .bind(link.owner_id)
        .bind(&link.token)
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_one(&self.db_connection_pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>, StoreError> {
        let link = sqlx::query_as(
            "select id, owner_id, token, created_at, expires_at, status from share_links where token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db_connection_pool)
        .await?;
        Ok(link)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShareLink>, StoreError> {
        let links = sqlx::query_as(
            r#"
              select id, owner_id, token, created_at, expires_at, status from share_links
              where owner_id = $1 order by created_at desc
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db_connection_pool)
        .await?;
        Ok(links)
    }

    async fn expire_active(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "update share_links set status = 'expired' where status = 'active' and expires_at <= $1",
        )
        .bind(now)
        .execute(&self.db_connection_pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn revoke(&self, link_id: Uuid, owner_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "update share_links set status = 'revoked' where id = $1 and owner_id = $2",
        )
        .bind(link_id)
        .bind(owner_id)
        .execute(&self.db_connection_pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, owner_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as(&format!(
            "select {PROFILE_COLUMNS} from users where id = $1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.db_connection_pool)
        .await?;
        Ok(profile)
    }

    async fn get_education(&self, owner_id: Uuid) -> Result<Vec<Education>, StoreError> {
        let education = sqlx::query_as(
            r#"
              select id, owner_id, kind, institution, degree, start_date, end_date from education
              where owner_id = $1 order by start_date desc
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db_connection_pool)
        .await?;
        Ok(education)
    }

    async fn get_experience(&self, owner_id: Uuid) -> Result<Vec<Experience>, StoreError> {
        let experience = sqlx::query_as(
            r#"
              select id, owner_id, title, company, start_date, end_date, description, linkedin_url
              from experience where owner_id = $1 order by start_date desc
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db_connection_pool)
        .await?;
        Ok(experience)
    }

    async fn find_by_api_key_hash(
        &self,
        api_key_hash: &str,
    ) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as(&format!(
            "select {PROFILE_COLUMNS} from users where api_key_hash = $1"
        ))
        .bind(api_key_hash)
        .fetch_optional(&self.db_connection_pool)
        .await?;
        Ok(profile)
    }
}
