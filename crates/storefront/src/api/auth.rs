//! Account endpoints.

use haat_core::{LoginRequest, SignupRequest, UserInfo};
use secrecy::SecretString;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange credentials for a user profile and bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` (or `ApiError::Api`) with the
    /// backend's message on bad credentials, or another error if the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<UserInfo, ApiError> {
        self.post("api/auth/login", request, None).await
    }

    /// Create an account. Answers like [`ApiClient::login`].
    ///
    /// # Errors
    ///
    /// Returns an error with the backend's message if the account cannot be
    /// created, or if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<UserInfo, ApiError> {
        self.post("api/auth/signup", request, None).await
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is no longer valid.
    #[instrument(skip_all)]
    pub async fn profile(&self, token: &SecretString) -> Result<UserInfo, ApiError> {
        self.get("api/auth/profile", Some(token)).await
    }
}
