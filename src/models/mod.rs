use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Default profile values applied when a stored document omits a field.
///
/// The mobile client renders these strings directly, so they stay in the
/// app's language (Spanish).
pub const DEFAULT_NAME: &str = "Usuario";
pub const DEFAULT_LOOKUP_NAME: &str = "Sin nombre";
pub const DEFAULT_AGE: i64 = 65;
pub const DEFAULT_GENDER: &str = "No especificado";
pub const DEFAULT_LEVEL: &str = "principiante";
pub const DEFAULT_MOOD: &str = "neutral";
pub const DEFAULT_CONDITION: &str = "Ninguna";
pub const DEFAULT_LAST_ACTIVITY: &str = "nunca";

/// A user document from the `users` collection.
///
/// Every field except the id is optional; older documents predate several of
/// them. `chronic_conditions` is stored inconsistently (sometimes a string,
/// sometimes missing), so deserialization accepts anything and keeps only a
/// well-formed list of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub fitness_level: Option<String>,
    /// Legacy alias for `fitness_level`, still present on older documents
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub chronic_conditions: Option<Vec<String>>,
    #[serde(default)]
    pub last_exercise_completed: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn age_or_default(&self) -> i64 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    pub fn gender_or_default(&self) -> &str {
        self.gender.as_deref().unwrap_or(DEFAULT_GENDER)
    }

    /// Fitness level, preferring the current field over the legacy alias
    pub fn level_or_default(&self) -> &str {
        self.fitness_level
            .as_deref()
            .or(self.level.as_deref())
            .unwrap_or(DEFAULT_LEVEL)
    }

    pub fn mood_or_default(&self) -> &str {
        self.mood.as_deref().unwrap_or(DEFAULT_MOOD)
    }

    pub fn conditions_or_default(&self) -> Vec<String> {
        match &self.chronic_conditions {
            Some(conditions) if !conditions.is_empty() => conditions.clone(),
            _ => vec![DEFAULT_CONDITION.to_string()],
        }
    }

    pub fn last_activity_or_default(&self) -> &str {
        self.last_exercise_completed
            .as_deref()
            .unwrap_or(DEFAULT_LAST_ACTIVITY)
    }
}

/// Accepts any stored value and keeps only an array of strings.
///
/// Non-array values (and non-string array elements) are dropped rather than
/// failing the whole document.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
        ),
        _ => None,
    })
}

/// How a user record was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoundBy {
    Id,
    Email,
}

impl Display for FoundBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoundBy::Id => write!(f, "id"),
            FoundBy::Email => write!(f, "email"),
        }
    }
}

/// A resolved user record together with how it was found
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub found_by: FoundBy,
    pub profile: UserProfile,
}

/// A structured exercise recommendation returned to the client.
///
/// Field names are the published wire contract consumed by the mobile app and
/// must stay in Spanish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub mensaje: String,
    pub ejercicio: Exercise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub nombre: String,
    pub duracion: String,
    pub tipo: String,
    pub nivel: String,
    pub consejo: String,
}

impl Recommendation {
    /// Fallback substituted when the model reply cannot be parsed
    pub fn parse_fallback(level: &str) -> Self {
        Self {
            mensaje: "¡Hola! 🌞 Hoy te recomiendo hacer algunos estiramientos suaves y mantenerte hidratado.".to_string(),
            ejercicio: Exercise {
                nombre: "Estiramiento de cuello y hombros".to_string(),
                duracion: "5 minutos".to_string(),
                tipo: "flexibilidad".to_string(),
                nivel: level.to_string(),
                consejo: "Haz movimientos lentos y suaves, sin forzar.".to_string(),
            },
        }
    }

    /// Fallback paired with a 500 when the pipeline fails before generation
    pub fn error_fallback() -> Self {
        Self {
            mensaje: "Hoy te recomiendo moverte un poquito y sonreír 🌿".to_string(),
            ejercicio: Exercise {
                nombre: "Caminata corta".to_string(),
                duracion: "5 minutos".to_string(),
                tipo: "movilidad".to_string(),
                nivel: DEFAULT_LEVEL.to_string(),
                consejo: "Da pasos suaves y respira profundo.".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_profile() -> UserProfile {
        serde_json::from_value(serde_json::json!({ "_id": "u1" })).unwrap()
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let profile = bare_profile();
        assert_eq!(profile.display_name(), "Usuario");
        assert_eq!(profile.age_or_default(), 65);
        assert_eq!(profile.gender_or_default(), "No especificado");
        assert_eq!(profile.level_or_default(), "principiante");
        assert_eq!(profile.mood_or_default(), "neutral");
        assert_eq!(profile.conditions_or_default(), vec!["Ninguna".to_string()]);
        assert_eq!(profile.last_activity_or_default(), "nunca");
    }

    #[test]
    fn test_level_prefers_fitness_level_over_legacy_alias() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "fitness_level": "intermedio",
            "level": "avanzado"
        }))
        .unwrap();
        assert_eq!(profile.level_or_default(), "intermedio");

        let legacy: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "level": "avanzado"
        }))
        .unwrap();
        assert_eq!(legacy.level_or_default(), "avanzado");
    }

    #[test]
    fn test_conditions_accepts_string_list() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "chronic_conditions": ["Hipertensión", "Artrosis"]
        }))
        .unwrap();
        assert_eq!(
            profile.conditions_or_default(),
            vec!["Hipertensión".to_string(), "Artrosis".to_string()]
        );
    }

    #[test]
    fn test_conditions_tolerates_non_list_value() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "chronic_conditions": "Hipertensión"
        }))
        .unwrap();
        assert_eq!(profile.chronic_conditions, None);
        assert_eq!(profile.conditions_or_default(), vec!["Ninguna".to_string()]);
    }

    #[test]
    fn test_conditions_empty_list_falls_back_to_sentinel() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "chronic_conditions": []
        }))
        .unwrap();
        assert_eq!(profile.conditions_or_default(), vec!["Ninguna".to_string()]);
    }

    #[test]
    fn test_found_by_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FoundBy::Id).unwrap(), r#""id""#);
        assert_eq!(serde_json::to_string(&FoundBy::Email).unwrap(), r#""email""#);
    }

    #[test]
    fn test_recommendation_wire_shape() {
        let rec = Recommendation::parse_fallback("principiante");
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["mensaje"].is_string());
        assert_eq!(json["ejercicio"]["nivel"], "principiante");
        assert!(json["ejercicio"]["consejo"].is_string());
    }
}
