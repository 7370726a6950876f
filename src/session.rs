use serde::{Deserialize, Serialize};

use crate::models::User;

/// Raised by [`Session::require_user`] when no identity is bound to the
/// session
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct Unauthenticated;

/// Identity and navigation state of one caller session. Passed by mutable
/// reference into the operations that need it; there is no process-wide
/// session singleton. The web layer owns persistence (cookie store or
/// similar), this type owns the keys and their rules.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Session {
    user_id: Option<i64>,
    nickname: Option<String>,
    avatar: Option<String>,
    email: Option<String>,
    redirect_to: Option<String>,
    oauth_state: Option<String>,
}

impl Session {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a resolved local user to the session
    pub fn bind(&mut self, user: &User) {
        self.user_id = Some(user.id);
        self.nickname = Some(user.nickname.clone());
        self.avatar = Some(user.avatar.clone());
        self.email = user.email.clone();
    }

    /// The capability check run at the start of every authenticated
    /// operation: the bound user id, or `Unauthenticated`
    pub fn require_user(&self) -> Result<i64, Unauthenticated> {
        self.user_id.ok_or(Unauthenticated)
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Store a post-login return path. Only same-origin relative paths are
    /// kept; absolute, protocol-relative and backslash-escaped candidates
    /// are discarded so the login flow cannot be used as an open redirect.
    pub fn capture_redirect(&mut self, candidate_url: &str) {
        if candidate_url.starts_with('/')
            && !candidate_url.starts_with("//")
            && !candidate_url.starts_with("/\\")
        {
            self.redirect_to = Some(candidate_url.to_owned());
        }
    }

    /// Pop the stored return path; returns it exactly once
    pub fn consume_redirect(&mut self) -> Option<String> {
        self.redirect_to.take()
    }

    /// Remember the OAuth state nonce for the in-flight login attempt
    pub fn set_oauth_state(&mut self, state: &str) {
        self.oauth_state = Some(state.to_owned());
    }

    /// Pop the OAuth state nonce; returns it exactly once
    pub fn take_oauth_state(&mut self) -> Option<String> {
        self.oauth_state.take()
    }

    /// Remove all identity keys (logout / account switch)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            nickname: "Mario".to_owned(),
            avatar: "default-avatar.png".to_owned(),
            vk_id: None,
            tg_id: Some("demo_tg_user".to_owned()),
            google_id: None,
            yandex_id: None,
            email: Some("tg_user@example.com".to_owned()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bind_stores_identity_keys() {
        let mut session = Session::new();
        assert_eq!(session.require_user(), Err(Unauthenticated));

        session.bind(&sample_user());

        assert_eq!(session.require_user(), Ok(7));
        assert_eq!(session.user_id(), Some(7));
        assert_eq!(session.nickname(), Some("Mario"));
        assert_eq!(session.avatar(), Some("default-avatar.png"));
        assert_eq!(session.email(), Some("tg_user@example.com"));
    }

    #[test]
    fn capture_redirect_keeps_relative_paths_only() {
        let mut session = Session::new();

        session.capture_redirect("/comments");
        assert_eq!(session.consume_redirect().as_deref(), Some("/comments"));

        session.capture_redirect("http://evil.example/x");
        assert_eq!(session.consume_redirect(), None);

        session.capture_redirect("https://site/path");
        assert_eq!(session.consume_redirect(), None);

        session.capture_redirect("//evil.example/x");
        assert_eq!(session.consume_redirect(), None);

        session.capture_redirect("/\\evil.example/x");
        assert_eq!(session.consume_redirect(), None);

        session.capture_redirect("");
        assert_eq!(session.consume_redirect(), None);
    }

    #[test]
    fn consume_redirect_pops_exactly_once() {
        let mut session = Session::new();
        session.capture_redirect("/comments?page=2");

        assert_eq!(
            session.consume_redirect().as_deref(),
            Some("/comments?page=2")
        );
        assert_eq!(session.consume_redirect(), None);
    }

    #[test]
    fn discarded_candidate_does_not_clobber_stored_path() {
        let mut session = Session::new();
        session.capture_redirect("/comments");
        session.capture_redirect("https://evil.example/");

        assert_eq!(session.consume_redirect().as_deref(), Some("/comments"));
    }

    #[test]
    fn oauth_state_round_trip() {
        let mut session = Session::new();
        assert_eq!(session.take_oauth_state(), None);

        session.set_oauth_state("nonce-123");
        assert_eq!(session.take_oauth_state().as_deref(), Some("nonce-123"));
        assert_eq!(session.take_oauth_state(), None);
    }

    #[test]
    fn clear_removes_all_keys() {
        let mut session = Session::new();
        session.bind(&sample_user());
        session.capture_redirect("/comments");
        session.set_oauth_state("nonce");

        session.clear();

        assert_eq!(session.require_user(), Err(Unauthenticated));
        assert_eq!(session.nickname(), None);
        assert_eq!(session.consume_redirect(), None);
        assert_eq!(session.take_oauth_state(), None);
    }
}
