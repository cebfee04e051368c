use crate::auth::{auth, Owner};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::AppError;
use crate::gateway::PublicAccessGateway;
use crate::model::{CreatedShareLink, OwnProfileView, ShareLinkSpecification};
use crate::service::ShareLinkService;
use crate::store::{ProfileStore, ShareLinkStore};
use crate::utils::{share_url, with_timeout};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderName, Method};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub share_links: ShareLinkService,
    pub gateway: PublicAccessGateway,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        links: Arc<dyn ShareLinkStore>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            share_links: ShareLinkService::new(links.clone(), clock.clone()),
            gateway: PublicAccessGateway::new(links, profiles.clone(), clock),
            profiles,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let owner_routes = Router::new()
        .route("/share-links", post(create_link).get(list_links))
        .route("/share-links/:id", delete(revoke_link))
        .route("/profile", get(own_profile))
        .route_layer(from_fn_with_state(state.clone(), auth));

    Router::new()
        .nest("/api/user", owner_routes)
        .route("/api/public/profile/:token", get(public_profile))
        .route("/api/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.client_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(crate::auth::API_KEY_HEADER),
            ]),
        None => CorsLayer::new(),
    }
}

pub async fn create_link(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    body: Result<Json<ShareLinkSpecification>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(specification) = body?;
    let days = specification
        .days()
        .ok_or_else(|| AppError::InvalidArgument("Invalid share duration".into()))?;
    let link = with_timeout(
        state.config.request_timeout_ms,
        state.share_links.create_link(owner.id, days),
    )
    .await??;
    let url = state
        .config
        .public_base_url
        .as_ref()
        .and_then(|base| share_url(base, &link.token));
    Ok(Json(json!({ "link": CreatedShareLink { link, url } })))
}

pub async fn list_links(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<Value>, AppError> {
    let links = with_timeout(
        state.config.request_timeout_ms,
        state.share_links.list_links(owner.id),
    )
    .await??;
    Ok(Json(json!({ "links": links })))
}

pub async fn revoke_link(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(link_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // A malformed id cannot name any link, so it gets the same no-op answer.
    if let Ok(link_id) = Uuid::parse_str(&link_id) {
        with_timeout(
            state.config.request_timeout_ms,
            state.share_links.revoke(link_id, owner.id),
        )
        .await??;
    }
    Ok(Json(json!({ "message": "Share link revoked" })))
}

pub async fn own_profile(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<OwnProfileView>, AppError> {
    let timeout = state.config.request_timeout_ms;
    let education = with_timeout(timeout, state.profiles.get_education(owner.id)).await??;
    let experience = with_timeout(timeout, state.profiles.get_experience(owner.id)).await??;
    Ok(Json(OwnProfileView {
        user: owner,
        education,
        experience,
    }))
}

pub async fn public_profile(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(token) = path?;
    let view = with_timeout(
        state.config.request_timeout_ms,
        state.gateway.resolve(&token),
    )
    .await??;
    Ok(Json(view))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "time": Utc::now().to_rfc3339() }))
}
