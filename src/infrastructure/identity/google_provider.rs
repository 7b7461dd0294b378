use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{FederatedProfile, IdentityProvider, IdentityProviderError};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth 2.0 authorization-code flow, requesting profile and email
/// scope.
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTH_URL,
            urlencode(&self.client_id),
            urlencode(&self.redirect_uri),
            urlencode("openid email profile"),
            urlencode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<FederatedProfile, IdentityProviderError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(IdentityProviderError::ExchangeFailed(format!(
                "status {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        let info: UserInfo = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| IdentityProviderError::ProfileFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityProviderError::ProfileFetchFailed(e.to_string()))?;

        tracing::debug!(subject = %info.sub, "Federated profile fetched");

        Ok(FederatedProfile {
            name: info.name.unwrap_or_else(|| "Unknown".to_string()),
            subject: info.sub,
            email: info.email,
            picture: info.picture,
        })
    }
}

/// Percent-encoding for query components; covers everything outside the
/// unreserved set.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
