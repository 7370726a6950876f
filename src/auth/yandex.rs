//! Real OAuth code flow against the Yandex OAuth and Login APIs.
//!
//! Authorization redirect → callback code → form-encoded token exchange →
//! bearer-authorized profile fetch. The avatar URL is derived from the
//! profile's avatar id via a fixed template.

use log::debug;
use serde::Deserialize;

use super::{AccessToken, AuthError, OAuthConfig, ProviderProfile};
use crate::models::Provider;

/// Authorization endpoint the user is redirected to
pub const AUTHORIZE_URL: &str = "https://oauth.yandex.ru/authorize";
/// Token exchange endpoint
pub const TOKEN_URL: &str = "https://oauth.yandex.ru/token";
/// Profile endpoint of the Yandex Login API
pub const PROFILE_URL: &str = "https://login.yandex.ru/info";

/// Avatar location for a given avatar id
#[must_use]
pub fn avatar_url(avatar_id: &str) -> String {
    format!("https://avatars.yandex.net/get-yapic/{avatar_id}/islands-200")
}

/// Build the authorization redirect target carrying the state nonce
pub fn authorize_url(config: &OAuthConfig, state: &str) -> Result<String, AuthError> {
    let url = reqwest::Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::Config(format!("unusable authorize url: {e}")))?;

    Ok(url.to_string())
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the callback's authorization code for an access token
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<AccessToken, AuthError> {
    debug!("exchanging authorization code at {TOKEN_URL}");

    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];

    let response = client.post(TOKEN_URL).form(&form).send().await?;

    if !response.status().is_success() {
        return Err(AuthError::UpstreamAuth(format!(
            "token endpoint returned status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        AuthError::UpstreamAuth(format!("failed to parse token response: {e}"))
    })?;

    Ok(AccessToken::new(&token.access_token))
}

/// Raw profile document of the Yandex Login API (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct YandexProfile {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub default_email: Option<String>,
    #[serde(default)]
    pub default_avatar_id: Option<String>,
    #[serde(default)]
    pub is_avatar_empty: Option<bool>,
}

/// Fetch the profile of the token's owner
pub async fn fetch_profile(
    client: &reqwest::Client,
    token: &AccessToken,
) -> Result<YandexProfile, AuthError> {
    debug!("fetching profile from {PROFILE_URL}");

    let response = client
        .get(PROFILE_URL)
        .query(&[("format", "json")])
        .bearer_auth(token.secret())
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AuthError::UpstreamAuth(format!(
            "profile endpoint returned status {}",
            response.status()
        )));
    }

    let profile: YandexProfile = response.json().await.map_err(|e| {
        AuthError::UpstreamAuth(format!("failed to parse profile response: {e}"))
    })?;

    Ok(profile)
}

impl YandexProfile {
    /// Collapse the raw document into the provider-agnostic profile.
    /// The display name falls back to the login; the avatar is skipped when
    /// Yandex marks it empty.
    #[must_use]
    pub fn into_profile(self) -> ProviderProfile {
        let nickname = match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.login.clone(),
        };

        let avatar = match (self.is_avatar_empty, self.default_avatar_id) {
            (Some(true), _) | (_, None) => None,
            (_, Some(avatar_id)) => Some(avatar_url(&avatar_id)),
        };

        ProviderProfile {
            provider: Provider::Yandex,
            external_id: self.id,
            nickname,
            avatar,
            email: self.default_email,
        }
    }
}
