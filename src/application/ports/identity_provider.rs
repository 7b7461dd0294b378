use async_trait::async_trait;

/// Profile returned by the federated identity provider after a successful
/// code exchange. The provider vouches for the email address.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub subject: String,
    pub email: Option<String>,
    pub name: String,
    pub picture: Option<String>,
}

/// Redirect-based OAuth handshake with the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to redirect the user agent to, carrying the anti-forgery state.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange the callback code for the subject's profile.
    async fn exchange_code(&self, code: &str) -> Result<FederatedProfile, IdentityProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityProviderError {
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),
    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),
}
