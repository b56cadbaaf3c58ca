use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    models::Recommendation,
    services::recommendation::{recommend_for, PipelineOutcome, Source},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Recommendation,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub source: Source,
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Health check answered on `GET`, so the mobile client can probe the
/// endpoint without spending a generation.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "message": "Endpoint activo. Usa POST con { userId } para obtener una recomendación."
        })),
    )
}

/// Any method other than GET/POST/OPTIONS
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Método no permitido",
            "recommendation": "Usa POST con { userId } para obtener tu recomendación 🌿"
        })),
    )
}

/// Generates a personalized exercise recommendation.
///
/// Client-side failures (missing userId, unknown user) return 400/404 with no
/// recommendation content. Everything else is caught by the safety net: the
/// caller always gets a renderable fallback payload, with a 500 status when
/// the failure was unexpected.
pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<RecommendationRequest>>,
) -> Response {
    let user_id = body
        .and_then(|Json(request)| request.user_id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let Some(user_id) = user_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Falta userId",
                "recommendation": "Necesito tu perfil para personalizar la recomendación 🌟"
            })),
        )
            .into_response();
    };

    match recommend_for(
        state.store.as_ref(),
        state.llm.as_ref(),
        &user_id,
        state.generation_timeout,
    )
    .await
    {
        Ok(PipelineOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "found": false,
                "message": "Usuario no encontrado",
                "project": state.project_id
            })),
        )
            .into_response(),
        Ok(PipelineOutcome::Generated {
            recommendation,
            source,
            user_id,
        }) => (
            StatusCode::OK,
            Json(RecommendationResponse {
                recommendation,
                user_id,
                source,
                model: Some(state.llm.model_id().to_string()),
                timestamp: Utc::now(),
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, user_id = %user_id, "Recommendation pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Error interno del servidor",
                    "recommendation": Recommendation::error_fallback(),
                    "userId": user_id,
                    "source": Source::Fallback,
                    "model": null,
                    "timestamp": Utc::now(),
                })),
            )
                .into_response()
        }
    }
}
