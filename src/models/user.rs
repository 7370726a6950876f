use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Avatar assigned when the login provider does not supply one
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

/// Social login provider whose external identity can be bound to a user.
/// The `google_id` column exists in the schema but has no login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Vk,
    Telegram,
    Yandex,
}

impl Provider {
    /// Column of the `"User"` table holding this provider's external id
    #[must_use]
    #[inline]
    pub const fn external_id_column(self) -> &'static str {
        match self {
            Self::Vk => "vk_id",
            Self::Telegram => "tg_id",
            Self::Yandex => "yandex_id",
        }
    }

    /// Short identifier used in placeholder emails and log messages
    #[must_use]
    #[inline]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Vk => "vk",
            Self::Telegram => "telegram",
            Self::Yandex => "yandex",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// User structure which is serialized from the database. At most one external
/// identity per provider; email is unique across users when present.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub avatar: String,
    pub vk_id: Option<String>,
    pub tg_id: Option<String>,
    pub google_id: Option<String>,
    pub yandex_id: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// External id bound for the given provider, if any
    #[must_use]
    pub fn external_id(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Vk => self.vk_id.as_deref(),
            Provider::Telegram => self.tg_id.as_deref(),
            Provider::Yandex => self.yandex_id.as_deref(),
        }
    }
}

/// Structure passed to the repository for User creation (bootstrap seeding)
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub nickname: String,
    pub avatar: String,
    pub email: Option<String>,
}

impl UserCreate {
    #[must_use]
    #[inline]
    pub fn new(nickname: &str, avatar: &str, email: Option<&str>) -> Self {
        Self {
            nickname: nickname.to_owned(),
            avatar: avatar.to_owned(),
            email: email.map(ToOwned::to_owned),
        }
    }
}

/// Structure passed to the repository to retrieve a user by their id
#[derive(Debug, Clone)]
pub struct UserGetById {
    pub id: i64,
}

impl UserGetById {
    #[must_use]
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Structure passed to the repository for updating a user's profile fields.
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: i64,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    #[must_use]
    #[inline]
    pub fn new(
        id: i64,
        nickname: Option<&str>,
        avatar: Option<&str>,
        email: Option<&str>,
    ) -> Self {
        Self {
            id,
            nickname: nickname.map(ToOwned::to_owned),
            avatar: avatar.map(ToOwned::to_owned),
            email: email.map(ToOwned::to_owned),
        }
    }

    /// Returns true when no field of the user would be changed
    #[must_use]
    pub const fn update_fields_none(&self) -> bool {
        self.nickname.is_none() && self.avatar.is_none() && self.email.is_none()
    }
}

/// Structure passed to the repository for deleting a user
#[derive(Debug, Clone)]
pub struct UserDelete {
    pub id: i64,
}

impl UserDelete {
    #[must_use]
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Structure passed to the repository to resolve an external identity into
/// a local user: lookup by provider id, create on first sight, refresh the
/// profile fields on every subsequent login.
#[derive(Debug, Clone)]
pub struct UserResolveIdentity {
    pub provider: Provider,
    pub external_id: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
}

impl UserResolveIdentity {
    #[must_use]
    #[inline]
    pub fn new(
        provider: Provider,
        external_id: &str,
        nickname: &str,
        avatar: Option<&str>,
        email: Option<&str>,
    ) -> Self {
        Self {
            provider,
            external_id: external_id.to_owned(),
            nickname: nickname.to_owned(),
            avatar: avatar.map(ToOwned::to_owned),
            email: email.map(ToOwned::to_owned),
        }
    }

    /// Email to persist on first sight: the provider's address, or a
    /// synthesized placeholder keyed on the external identity.
    #[must_use]
    pub fn email_or_placeholder(&self) -> String {
        self.email.clone().unwrap_or_else(|| {
            format!("{}_{}@example.com", self.provider.slug(), self.external_id)
        })
    }

    /// Avatar to persist: the provider's URL, or the default placeholder
    #[must_use]
    pub fn avatar_or_default(&self) -> &str {
        self.avatar.as_deref().unwrap_or(DEFAULT_AVATAR)
    }
}
