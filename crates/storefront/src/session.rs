//! Signed-in user session, analytics session id and language preference.
//!
//! The session is whatever is persisted under `userInfo` and `token`. A
//! stored session is trusted until the API rejects its token; nothing here
//! checks expiry.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use haat_core::{Email, Language, LoginRequest, SignupRequest, UserInfo};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::{AppError, MIN_PASSWORD_LEN, ValidationError};
use crate::storage::{Storage, StorageExt, keys};

/// An authenticated user together with the bearer token.
struct Session {
    user: UserInfo,
    token: SecretString,
}

/// Signup form input.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Check the form before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: missing name, malformed email,
    /// short password or mismatched confirmation.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        let email = Email::parse(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(email)
    }
}

/// Client-side session state backed by persistent storage.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    current: RwLock<Option<Session>>,
    analytics_id: OnceLock<String>,
}

impl SessionStore {
    /// Restore the session persisted in `storage`, if any.
    ///
    /// The profile is read from `userInfo`, falling back to the legacy
    /// `user` key. The token is read from `token`, falling back to the token
    /// embedded in the profile. A profile that cannot be decoded is treated
    /// as signed out.
    #[must_use]
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let current = read_session(storage.as_ref());
        Self {
            storage,
            current: RwLock::new(current),
            analytics_id: OnceLock::new(),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserInfo> {
        self.read(|s| s.user.clone())
    }

    /// Bearer token of the signed-in user, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(|s| SecretString::from(s.token.expose_secret().to_owned()))
    }

    /// Whether a user session is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }

    /// Persist `user` as the signed-in session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` if the profile carries no token, or a
    /// storage error if it cannot be persisted.
    pub fn establish(&self, mut user: UserInfo) -> Result<UserInfo, AppError> {
        let token = user
            .token
            .take()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("login response carried no token".to_string()))?;

        let mut stored = user.clone();
        stored.token = Some(token.clone());
        self.storage.set_json(keys::USER_INFO, &stored)?;
        self.storage.set(keys::TOKEN, &token)?;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            user: user.clone(),
            token: SecretString::from(token),
        });

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty password,
    /// the API's error for rejected credentials, or a storage error.
    #[instrument(skip(self, api, password))]
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, AppError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        if password.is_empty() {
            return Err(ValidationError::Required("password").into());
        }

        let user = api
            .login(&LoginRequest {
                email: email.as_str(),
                password,
            })
            .await?;
        self.establish(user)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is invalid, the API's error if
    /// the account cannot be created, or a storage error.
    #[instrument(skip_all)]
    pub async fn signup(&self, api: &ApiClient, form: &SignupForm) -> Result<UserInfo, AppError> {
        let email = form.validate()?;
        let user = api
            .signup(&SignupRequest {
                name: form.name.trim(),
                email: email.as_str(),
                password: &form.password,
            })
            .await?;
        self.establish(user)
    }

    /// Refresh the stored profile from the API, keeping the current token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when signed out, the API's error when
    /// the token is rejected, or a storage error.
    pub async fn refresh_profile(&self, api: &ApiClient) -> Result<UserInfo, AppError> {
        let token = self
            .token()
            .ok_or_else(|| AppError::Unauthorized("sign in to view your profile".to_string()))?;
        let mut user = api.profile(&token).await?;
        user.token = Some(token.expose_secret().to_owned());
        self.establish(user)
    }

    /// Forget the session. Signing out while signed out is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted session cannot be removed.
    pub fn logout(&self) -> Result<(), AppError> {
        self.storage.remove(keys::USER_INFO)?;
        self.storage.remove(keys::LEGACY_USER)?;
        self.storage.remove(keys::TOKEN)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// Anonymous session id attached to analytics events and orders.
    ///
    /// Generated once, persisted under `analytics_session_id` and never
    /// rotated. If storage fails the id lives for this process only.
    pub fn analytics_session_id(&self) -> String {
        self.analytics_id
            .get_or_init(|| load_or_create_session_id(self.storage.as_ref()))
            .clone()
    }

    /// Stored language preference; English when unset or unrecognized.
    #[must_use]
    pub fn language(&self) -> Language {
        self.storage
            .get(keys::LANGUAGE)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Persist the language preference.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the preference cannot be written.
    pub fn set_language(&self, language: Language) -> Result<(), AppError> {
        self.storage.set(keys::LANGUAGE, &language.to_string())?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current_user())
            .field("token", &self.is_authenticated().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

fn read_session(storage: &dyn Storage) -> Option<Session> {
    let user = [keys::USER_INFO, keys::LEGACY_USER]
        .into_iter()
        .find_map(|key| match storage.get_json::<UserInfo>(key) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored profile");
                None
            }
        })?;

    let token = storage
        .get(keys::TOKEN)
        .ok()
        .flatten()
        .or_else(|| user.token.clone())
        .filter(|t| !t.trim().is_empty())?;

    let mut user = user;
    user.token = None;
    Some(Session {
        user,
        token: SecretString::from(token),
    })
}

fn load_or_create_session_id(storage: &dyn Storage) -> String {
    match storage.get(keys::ANALYTICS_SESSION_ID) {
        Ok(Some(id)) if !id.trim().is_empty() => return id,
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not read analytics session id"),
    }

    let id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = storage.set(keys::ANALYTICS_SESSION_ID, &id) {
        tracing::warn!(error = %e, "Could not persist analytics session id");
    }
    id
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    fn user_json(token: Option<&str>) -> serde_json::Value {
        let mut value = json!({"_id": "u1", "name": "Karim", "email": "karim@example.com"});
        if let Some(token) = token {
            value["token"] = json!(token);
        }
        value
    }

    fn store_with(entries: &[(&str, String)]) -> Arc<dyn Storage> {
        let storage = MemoryStorage::new();
        for (key, value) in entries {
            storage.set(key, value).unwrap();
        }
        Arc::new(storage)
    }

    #[test]
    fn test_restore_signed_out() {
        let session = SessionStore::restore(Arc::new(MemoryStorage::new()));
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_restore_from_user_info_and_token() {
        let storage = store_with(&[
            (keys::USER_INFO, user_json(None).to_string()),
            (keys::TOKEN, "jwt-1".to_string()),
        ]);
        let session = SessionStore::restore(storage);
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose_secret(), "jwt-1");
        assert_eq!(session.current_user().unwrap().name, "Karim");
    }

    #[test]
    fn test_restore_from_legacy_key_with_embedded_token() {
        let storage = store_with(&[(keys::LEGACY_USER, user_json(Some("jwt-legacy")).to_string())]);
        let session = SessionStore::restore(storage);
        assert_eq!(session.token().unwrap().expose_secret(), "jwt-legacy");
        assert!(session.current_user().unwrap().token.is_none());
    }

    #[test]
    fn test_profile_without_token_is_signed_out() {
        let storage = store_with(&[(keys::USER_INFO, user_json(None).to_string())]);
        assert!(!SessionStore::restore(storage).is_authenticated());
    }

    #[test]
    fn test_establish_and_logout() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = SessionStore::restore(Arc::clone(&storage));
        let user: UserInfo = serde_json::from_value(user_json(Some("jwt-2"))).unwrap();

        let user = session.establish(user).unwrap();
        assert!(user.token.is_none());
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("jwt-2"));
        assert!(SessionStore::restore(Arc::clone(&storage)).is_authenticated());

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(storage.get(keys::USER_INFO).unwrap(), None);
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn test_establish_requires_token() {
        let session = SessionStore::restore(Arc::new(MemoryStorage::new()));
        let user: UserInfo = serde_json::from_value(user_json(None)).unwrap();
        assert!(matches!(
            session.establish(user),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_analytics_session_id_is_stable_and_persisted() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let first = SessionStore::restore(Arc::clone(&storage)).analytics_session_id();
        let second = SessionStore::restore(Arc::clone(&storage)).analytics_session_id();
        assert_eq!(first, second);
        assert_eq!(
            storage.get(keys::ANALYTICS_SESSION_ID).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_language_preference() {
        let session = SessionStore::restore(Arc::new(MemoryStorage::new()));
        assert_eq!(session.language(), Language::En);
        session.set_language(Language::Bn).unwrap();
        assert_eq!(session.language(), Language::Bn);
    }

    #[test]
    fn test_signup_form_validation() {
        let mut form = SignupForm {
            name: "Karim".to_string(),
            email: "karim@example.com".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        };
        assert!(form.validate().is_ok());

        form.confirm_password = "secreT".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::PasswordMismatch)));

        form.password = "abc".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::PasswordTooShort)));

        form.email = "not-an-email".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::Email(_))));

        form.name = "  ".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::Required("name"))));
    }
}
