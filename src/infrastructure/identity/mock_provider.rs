use async_trait::async_trait;

use crate::application::ports::{FederatedProfile, IdentityProvider, IdentityProviderError};

/// Resolves every code to a fixed profile.
pub struct MockIdentityProvider {
    pub profile: FederatedProfile,
}

impl MockIdentityProvider {
    pub fn returning(profile: FederatedProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?state={}", state)
    }

    async fn exchange_code(&self, _code: &str) -> Result<FederatedProfile, IdentityProviderError> {
        Ok(self.profile.clone())
    }
}
