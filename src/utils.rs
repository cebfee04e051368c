use crate::error::AppError;
use axum::http::HeaderMap;
use rand::Rng;
use sha3::{Digest, Sha3_256};
use std::env;
use std::future::Future;
use std::time::Duration;
use url::Url;

pub const TOKEN_BYTES: usize = 16;

pub async fn with_timeout<F: Future>(
    duration_in_mills: u64,
    task: F,
) -> Result<<F as Future>::Output, AppError> {
    tokio::time::timeout(Duration::from_millis(duration_in_mills), task)
        .await
        .map_err(|_| AppError::Timeout(duration_in_mills))
}

pub fn get_env(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("Environment variable {} is required", name))
}

pub fn get_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub fn get_header(name: &str, headers: &HeaderMap) -> Option<String> {
    headers
        .get(name)
        .map(|value| value.to_str().unwrap_or_default().to_string())
}

pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(api_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 128 random bits rendered as 32 lowercase hex characters.
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

pub fn parse_base_url(text: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(text)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Public address of the shared profile page for `token`.
pub fn share_url(base: &Url, token: &str) -> Option<String> {
    base.join(&format!("share/{token}")).ok().map(String::from)
}
