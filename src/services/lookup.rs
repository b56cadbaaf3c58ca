use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{FoundBy, ResolvedUser},
};

/// Resolves a user record by id, falling back to email equality.
///
/// Inputs are trimmed; the email is additionally lowercased before querying.
/// Id resolution always wins: when a document exists at the given id, it is
/// returned even if another document would also match by email.
///
/// Returns `Ok(None)` when neither path resolves, so callers can shape their
/// own not-found payloads. Fails with `InvalidInput` when neither an id nor an
/// email was supplied.
pub async fn resolve_user(
    store: &dyn ProfileStore,
    user_id: Option<&str>,
    email: Option<&str>,
) -> AppResult<Option<ResolvedUser>> {
    let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());
    let email = email
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty());

    if user_id.is_none() && email.is_none() {
        return Err(AppError::InvalidInput(
            "Falta userId o email en la query".to_string(),
        ));
    }

    if let Some(id) = user_id {
        if let Some(profile) = store.get_by_id(id).await? {
            tracing::info!(user_id = %id, found_by = %FoundBy::Id, "User resolved");
            return Ok(Some(ResolvedUser {
                found_by: FoundBy::Id,
                profile,
            }));
        }
    }

    if let Some(email) = email {
        if let Some(profile) = store.find_by_email(&email).await? {
            tracing::info!(email = %email, found_by = %FoundBy::Email, "User resolved");
            return Ok(Some(ResolvedUser {
                found_by: FoundBy::Email,
                profile,
            }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockProfileStore;
    use crate::models::UserProfile;
    use mockall::predicate::eq;

    fn profile(id: &str, email: Option<&str>) -> UserProfile {
        let mut value = serde_json::json!({ "_id": id });
        if let Some(email) = email {
            value["email"] = serde_json::json!(email);
        }
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_neither_id_nor_email_is_invalid_input() {
        let store = MockProfileStore::new();
        let result = resolve_user(&store, None, None).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_blank_inputs_are_invalid_input() {
        let store = MockProfileStore::new();
        let result = resolve_user(&store, Some("   "), Some(" \t")).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_resolves_by_id_first() {
        let mut store = MockProfileStore::new();
        store
            .expect_get_by_id()
            .with(eq("u123"))
            .returning(|id| Ok(Some(profile(id, None))));
        // find_by_email must not be called when the id resolves
        store.expect_find_by_email().never();

        let resolved = resolve_user(&store, Some("u123"), Some("other@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.found_by, FoundBy::Id);
        assert_eq!(resolved.profile.id, "u123");
    }

    #[tokio::test]
    async fn test_falls_back_to_email_when_id_misses() {
        let mut store = MockProfileStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        store
            .expect_find_by_email()
            .with(eq("ana@example.com"))
            .returning(|email| Ok(Some(profile("real-id", Some(email)))));

        let resolved = resolve_user(&store, Some("missing"), Some("ana@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.found_by, FoundBy::Email);
        assert_eq!(resolved.profile.id, "real-id");
    }

    #[tokio::test]
    async fn test_email_is_trimmed_and_lowercased() {
        let mut store = MockProfileStore::new();
        store
            .expect_find_by_email()
            .with(eq("foo@bar.com"))
            .returning(|email| Ok(Some(profile("u1", Some(email)))));

        let resolved = resolve_user(&store, None, Some("  Foo@Bar.com  "))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.found_by, FoundBy::Email);
    }

    #[tokio::test]
    async fn test_user_id_is_trimmed() {
        let mut store = MockProfileStore::new();
        store
            .expect_get_by_id()
            .with(eq("u123"))
            .returning(|id| Ok(Some(profile(id, None))));

        let resolved = resolve_user(&store, Some("  u123  "), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.profile.id, "u123");
    }

    #[tokio::test]
    async fn test_no_match_returns_none() {
        let mut store = MockProfileStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        store.expect_find_by_email().returning(|_| Ok(None));

        let resolved = resolve_user(&store, Some("ghost"), Some("ghost@example.com"))
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
