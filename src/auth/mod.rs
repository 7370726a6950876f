use serde::Deserialize;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Provider, User, UserResolveIdentity};
use crate::repositories::{UserRepository, UserRepositoryResolveIdentity};

pub mod yandex;

/// Errors produced by the social login flow.
///
/// Callers surface [`AuthError::user_message`] to the end user; the variant
/// detail is for logs only and never leaks upstream responses to the client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider redirected back without an authorization code.
    #[error("the authorization callback is missing the code parameter")]
    MissingCode,

    /// The callback's state does not match the nonce stored in the session.
    #[error("the authorization callback state does not match the stored nonce")]
    StateMismatch,

    /// Token exchange or profile fetch failed (network or non-2xx).
    #[error("upstream authorization failed: {0}")]
    UpstreamAuth(String),

    /// The OAuth client configuration is missing or unusable.
    #[error("missing OAuth configuration: {0}")]
    Config(String),

    /// Resolving the identity against the user store failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl AuthError {
    /// Generic outcome shown to the end user, whatever actually failed
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        "authorization failed"
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        Self::UpstreamAuth(value.to_string())
    }
}

/// Query parameters the provider sends to the callback endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackParams {
    #[must_use]
    pub fn new(code: Option<&str>, state: Option<&str>) -> Self {
        Self {
            code: code.map(ToOwned::to_owned),
            state: state.map(ToOwned::to_owned),
        }
    }

    /// The authorization code of the callback, if the provider sent one
    pub fn require_code(&self) -> Result<&str, AuthError> {
        self.code.as_deref().ok_or(AuthError::MissingCode)
    }

    /// Compare the callback's state against the nonce the session stored
    /// when the login attempt started
    pub fn verify_state(&self, expected: &str) -> Result<(), AuthError> {
        match self.state.as_deref() {
            Some(state) if state == expected => Ok(()),
            _ => Err(AuthError::StateMismatch),
        }
    }
}

/// Fresh state nonce for an outgoing authorization redirect
#[must_use]
pub fn new_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Bearer token produced by the token-exchange stage of a login attempt
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    #[inline]
    pub fn new(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    /// The token value stays out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Profile fields fetched from (or mocked for) a provider; the input of the
/// final resolution stage of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub external_id: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
}

impl ProviderProfile {
    /// Repository parameters resolving this profile to a local user
    #[must_use]
    pub fn into_resolve(self) -> UserResolveIdentity {
        UserResolveIdentity {
            provider: self.provider,
            external_id: self.external_id,
            nickname: self.nickname,
            avatar: self.avatar,
            email: self.email,
        }
    }
}

/// Fixed demo identity of the mock login path for the given provider:
/// a deterministic lookup-or-create key, no network, no token exchange
#[must_use]
pub fn demo_profile(provider: Provider) -> ProviderProfile {
    let (external_id, nickname, email) = match provider {
        Provider::Vk => ("demo_vk_user", "VK_User_Demo", "vk_user@example.com"),
        Provider::Telegram => ("demo_tg_user", "Telegram_User", "tg_user@example.com"),
        Provider::Yandex => ("demo_yandex_user", "Yandex_User", "yandex_user@example.com"),
    };

    ProviderProfile {
        provider,
        external_id: external_id.to_owned(),
        nickname: nickname.to_owned(),
        avatar: None,
        email: Some(email.to_owned()),
    }
}

/// OAuth client configuration of a real provider application
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
        }
    }

    /// Read the Yandex application credentials from the environment
    pub fn yandex_from_env() -> Result<Self, AuthError> {
        Ok(Self {
            client_id: env_var("YANDEX_CLIENT_ID")?,
            client_secret: env_var("YANDEX_CLIENT_SECRET")?,
            redirect_uri: env_var("YANDEX_REDIRECT_URI")?,
        })
    }
}

fn env_var(name: &str) -> Result<String, AuthError> {
    std::env::var(name).map_err(|_| AuthError::Config(name.to_owned()))
}

/// A provider login entry point: the deterministic mock path or the real
/// OAuth code flow. Both resolve through the same identity contract.
#[derive(Debug, Clone)]
pub enum LoginProvider {
    Mock(Provider),
    OAuth(Provider, OAuthConfig),
}

impl LoginProvider {
    #[must_use]
    pub const fn provider(&self) -> Provider {
        match self {
            Self::Mock(provider) | Self::OAuth(provider, _) => *provider,
        }
    }

    /// Run a login attempt to completion: authorization code → access token
    /// → provider profile → resolved local user. Each stage is only
    /// constructible from the previous one; the mock path starts at the
    /// profile stage directly.
    pub async fn login(
        &self,
        client: &reqwest::Client,
        callback: &CallbackParams,
        users: &mut UserRepository,
    ) -> Result<User, AuthError> {
        let profile = match self {
            Self::Mock(provider) => demo_profile(*provider),
            Self::OAuth(provider, config) => {
                let code = callback.require_code()?;
                match provider {
                    Provider::Yandex => {
                        let token = yandex::exchange_code(client, config, code).await?;
                        let raw = yandex::fetch_profile(client, &token).await?;
                        raw.into_profile()
                    }
                    other => {
                        return Err(AuthError::Config(format!(
                            "provider {other} has no real OAuth flow, use the mock login"
                        )));
                    }
                }
            }
        };

        let user = users.resolve_identity(&profile.into_resolve()).await?;
        Ok(user)
    }
}
