/// Recommendation pipeline
///
/// Resolves a profile, builds the coaching prompt, invokes the model under an
/// explicit deadline, and extracts a structured recommendation from whatever
/// text comes back. Malformed model output is never an error: it downgrades to
/// a fixed fallback recommendation marked with `source: "fallback"`.
use std::time::Duration;

use serde::Serialize;

use crate::{
    db::ProfileStore,
    error::AppResult,
    models::{Recommendation, UserProfile},
    services::{
        lookup,
        providers::{GenerationParams, TextGenerator},
    },
};

/// Provenance of the recommendation content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Gemini,
    Fallback,
}

/// Outcome of the recommendation pipeline for a resolved request
#[derive(Debug)]
pub enum PipelineOutcome {
    /// No document matched the identifier (directly or as an email)
    NotFound,
    /// A recommendation is ready, model-generated or substituted
    Generated {
        recommendation: Recommendation,
        source: Source,
        user_id: String,
    },
}

/// Runs the full pipeline for one request.
///
/// The identifier doubles as the email fallback value, since this endpoint
/// accepts only one field. Lookup and transport failures propagate to the
/// caller's safety net; generation timeouts and unparsable replies do not.
pub async fn recommend_for(
    store: &dyn ProfileStore,
    llm: &dyn TextGenerator,
    user_id: &str,
    generation_timeout: Duration,
) -> AppResult<PipelineOutcome> {
    let user_id = user_id.trim();

    let resolved = match lookup::resolve_user(store, Some(user_id), Some(user_id)).await? {
        Some(resolved) => resolved,
        None => {
            tracing::warn!(user_id = %user_id, "No profile found for recommendation");
            return Ok(PipelineOutcome::NotFound);
        }
    };

    let profile = &resolved.profile;
    let prompt = build_prompt(profile);
    let params = GenerationParams::default();

    let (recommendation, source) =
        match tokio::time::timeout(generation_timeout, llm.generate(&prompt, &params)).await {
            Ok(Ok(raw_text)) => match parse_recommendation(&raw_text) {
                Some(recommendation) => (recommendation, Source::Gemini),
                None => {
                    tracing::warn!(
                        user_id = %profile.id,
                        raw_len = raw_text.len(),
                        "Model reply was not parsable, substituting fallback"
                    );
                    (
                        Recommendation::parse_fallback(profile.level_or_default()),
                        Source::Fallback,
                    )
                }
            },
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                tracing::warn!(
                    user_id = %profile.id,
                    timeout_secs = generation_timeout.as_secs(),
                    "Generation timed out, substituting fallback"
                );
                (
                    Recommendation::parse_fallback(profile.level_or_default()),
                    Source::Fallback,
                )
            }
        };

    tracing::info!(
        user_id = %profile.id,
        source = ?source,
        "Recommendation generated"
    );

    Ok(PipelineOutcome::Generated {
        recommendation,
        source,
        user_id: user_id.to_string(),
    })
}

/// Builds the coaching prompt from a profile, with defaults substituted for
/// missing fields. Prompt language matches the app's audience.
pub fn build_prompt(profile: &UserProfile) -> String {
    format!(
        r#"Eres **Sofi**, la entrenadora virtual de *Senior Fitness*.
Tu objetivo es motivar, cuidar y acompañar al usuario con empatía.

Datos del usuario:
- Nombre: {name}
- Edad: {age} años
- Género: {gender}
- Nivel físico: {level}
- Estado de ánimo actual: {mood}
- Condiciones médicas: {conditions}
- Último ejercicio: {last_activity}

Instrucciones:
1. Usa un tono cálido, natural y cercano. No suenes robótica.
2. Ofrece una recomendación de ejercicio segura y adaptada al nivel y estado de ánimo.
3. Incluye una breve justificación y un consejo de bienestar general.
4. Si el usuario está "cansado", prioriza ejercicios suaves o de respiración.
5. Si está "motivado", sugiere algo un poco más activo (dentro de su nivel).
6. Devuelve el resultado en formato JSON con esta estructura:

{{
  "mensaje": "...",
  "ejercicio": {{
    "nombre": "...",
    "duracion": "...",
    "tipo": "...",
    "nivel": "...",
    "consejo": "..."
  }}
}}

Usa máximo 2 emojis."#,
        name = profile.display_name(),
        age = profile.age_or_default(),
        gender = profile.gender_or_default(),
        level = profile.level_or_default(),
        mood = profile.mood_or_default(),
        conditions = profile.conditions_or_default().join(", "),
        last_activity = profile.last_activity_or_default(),
    )
}

/// Parses a model reply into a recommendation, or `None` when nothing usable
/// can be extracted.
pub fn parse_recommendation(raw_text: &str) -> Option<Recommendation> {
    let json = extract_json(raw_text)?;
    serde_json::from_str(&json).ok()
}

/// Extracts a JSON object from free-form model text.
///
/// Models wrap JSON in prose or code fences often enough that this needs to be
/// tolerant, but a first-brace-to-last-brace slice alone is wrong for strings
/// containing braces. Every candidate is therefore validated by parsing before
/// it is accepted.
fn extract_json(text: &str) -> Option<String> {
    let text = text.trim();

    // Whole reply is already JSON
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        return Some(text.to_string());
    }

    // JSON object embedded in surrounding prose
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            let candidate = &text[start..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    // JSON inside a fenced code block
    if let Some(fence_start) = text.find("```") {
        let after_fence = &text[fence_start + 3..];
        let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
        if let Some(fence_end) = after_fence.find("```") {
            return extract_json(after_fence[..fence_end].trim());
        }
    }

    None
}
