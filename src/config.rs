use crate::utils::{get_env, get_optional_env, parse_base_url};
use axum::http::HeaderValue;
use url::Url;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 300;

/// Process configuration, read once at start-up and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_address: String,
    pub database_max_connections: u32,
    pub request_timeout_ms: u64,
    /// Cron expression for the background sweep; lazy expiry only when unset.
    pub sweep_cron: Option<String>,
    /// Base address of the front end, used to build share urls.
    pub public_base_url: Option<Url>,
    /// Origin allowed to call the api from a browser.
    pub client_origin: Option<HeaderValue>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: get_env("DATABASE_URL"),
            server_address: get_env("SERVER_ADDRESS"),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS),
            sweep_cron: get_optional_env("SWEEP_CRON"),
            public_base_url: get_optional_env("PUBLIC_BASE_URL").map(|text| {
                parse_base_url(&text).expect("PUBLIC_BASE_URL must be an absolute url")
            }),
            client_origin: get_optional_env("CLIENT_URL").map(|origin| {
                origin
                    .parse()
                    .expect("CLIENT_URL must be a valid header value")
            }),
        }
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_optional_env(name)
        .map(|value| {
            value
                .parse()
                .unwrap_or_else(|_| panic!("Environment variable {} is malformed", name))
        })
        .unwrap_or(default)
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            server_address: "127.0.0.1:0".into(),
            database_max_connections: 1,
            request_timeout_ms: 1_000,
            sweep_cron: None,
            public_base_url: parse_base_url("https://members.example.com").ok(),
            client_origin: None,
        }
    }
}
