use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppResult,
    models::{DEFAULT_GENDER, DEFAULT_LEVEL, DEFAULT_LOOKUP_NAME},
    services::lookup,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Looks up a user by id or email and returns a normalized projection.
///
/// Validation failures and store errors map through `AppError`; the not-found
/// payload names the field that was searched to aid client debugging.
pub async fn check_user(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> AppResult<Response> {
    let resolved = lookup::resolve_user(
        state.store.as_ref(),
        params.user_id.as_deref(),
        params.email.as_deref(),
    )
    .await?;

    let Some(resolved) = resolved else {
        let supplied_id = params
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let (by, value) = match supplied_id {
            Some(user_id) => ("userId", user_id.to_string()),
            None => (
                "email",
                params.email.as_deref().unwrap_or_default().trim().to_string(),
            ),
        };
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "found": false,
                "message": "Usuario no encontrado",
                "searched": { "by": by, "value": value }
            })),
        )
            .into_response());
    };

    let profile = &resolved.profile;
    Ok((
        StatusCode::OK,
        Json(json!({
            "found": true,
            "message": "Usuario encontrado correctamente",
            "foundBy": resolved.found_by,
            "realUserId": profile.id,
            "name": profile.name.as_deref().unwrap_or(DEFAULT_LOOKUP_NAME),
            "email": profile.email,
            "age": profile.age,
            "gender": profile.gender.as_deref().unwrap_or(DEFAULT_GENDER),
            // The lookup projection is the one place the legacy `level`
            // field wins over `fitness_level`; clients registered before the
            // rename still read it back unchanged here.
            "level": profile
                .level
                .as_deref()
                .or(profile.fitness_level.as_deref())
                .unwrap_or(DEFAULT_LEVEL),
        })),
    )
        .into_response())
}
