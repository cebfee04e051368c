use crate::error::AppError;
use crate::model::Profile;
use crate::routes::AppState;
use crate::utils::{get_header, hash_api_key, with_timeout};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::IntoResponse;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The authenticated profile owner, attached to the request by [`auth`].
#[derive(Clone, Debug)]
pub struct Owner(pub Profile);

pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let api_key = get_header(API_KEY_HEADER, request.headers())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Request without api key");
            AppError::Unauthorized
        })?;

    let profile = with_timeout(
        state.config.request_timeout_ms,
        state.profiles.find_by_api_key_hash(&hash_api_key(&api_key)),
    )
    .await??
    .ok_or_else(|| {
        tracing::debug!("Unknown api key");
        AppError::Unauthorized
    })?;

    if profile.is_blocked {
        tracing::warn!(owner_id = %profile.id, "Blocked user rejected");
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(Owner(profile));
    Ok(next.run(request).await)
}
