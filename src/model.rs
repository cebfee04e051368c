use crate::error::AppError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "share_link_status", rename_all = "lowercase")]
pub enum ShareLinkStatus {
    Active,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShareLink {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: ShareLinkStatus,
}

impl ShareLink {
    /// Status and wall clock must both agree; the stored status may lag expiry.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ShareLinkStatus::Active && now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewShareLink {
    pub owner_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Lifetimes an owner may pick for a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareDuration {
    OneDay,
    TwoDays,
}

impl ShareDuration {
    pub fn as_duration(self) -> Duration {
        match self {
            ShareDuration::OneDay => Duration::days(1),
            ShareDuration::TwoDays => Duration::days(2),
        }
    }
}

impl TryFrom<i64> for ShareDuration {
    type Error = AppError;

    fn try_from(days: i64) -> Result<Self, Self::Error> {
        match days {
            1 => Ok(ShareDuration::OneDay),
            2 => Ok(ShareDuration::TwoDays),
            _ => Err(AppError::InvalidArgument("Invalid share duration".into())),
        }
    }
}

/// Request body for a new link. Only a JSON object is accepted.
#[derive(Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ShareLinkSpecification {
    pub days: Value,
}

impl From<Map<String, Value>> for ShareLinkSpecification {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            days: body.remove("days").unwrap_or(Value::Null),
        }
    }
}

impl ShareLinkSpecification {
    /// Accepts integral JSON numbers and numeric strings such as `"2"`.
    pub fn days(&self) -> Option<i64> {
        match &self.days {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|d| d.fract() == 0.0).map(|d| d as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedShareLink {
    #[serde(flatten)]
    pub link: ShareLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Full profile row as the owner sees it. Credentials never leave the store layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub member_id: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub qualification: Option<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// The slice of a profile that a share link exposes.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub full_name: Option<String>,
    pub qualification: Option<String>,
    pub phone_number: Option<String>,
    pub email: String,
    pub member_id: Option<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
}

impl From<Profile> for PublicProfile {
    fn from(profile: Profile) -> Self {
        PublicProfile {
            full_name: profile.full_name,
            qualification: profile.qualification,
            phone_number: profile.phone_number,
            email: profile.email,
            member_id: profile.member_id,
            resume_url: profile.resume_url,
            photo_url: profile.photo_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Education {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Experience {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicProfileView {
    pub profile: PublicProfile,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
}

#[derive(Debug, Serialize)]
pub struct OwnProfileView {
    pub user: Profile,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
}
