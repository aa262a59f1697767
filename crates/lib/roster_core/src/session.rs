//! Session credentials and the OAuth callback.
//!
//! The access and refresh tokens are stored like browser cookies: each under a
//! fixed name with its own expiry. An expired cookie reads as absent.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::storage::{KeyValueStore, StorageError, load_json, save_json};

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Access token lifetime: 7 days.
pub const ACCESS_COOKIE_DAYS: i64 = 7;
/// Refresh token lifetime: 30 days.
pub const REFRESH_COOKIE_DAYS: i64 = 30;

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/login";
/// Where a successful callback lands.
pub const SERVERS_PATH: &str = "/servers";

/// The token pair issued by the OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Cookie-style credential storage.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store both tokens with their respective expiries.
    pub fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let now = Utc::now();
        self.set_cookie(
            ACCESS_COOKIE,
            &credentials.access_token,
            now + Duration::days(ACCESS_COOKIE_DAYS),
        )?;
        self.set_cookie(
            REFRESH_COOKIE,
            &credentials.refresh_token,
            now + Duration::days(REFRESH_COOKIE_DAYS),
        )
    }

    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.cookie(ACCESS_COOKIE)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.cookie(REFRESH_COOKIE)
    }

    /// Remove both tokens. Both removals are attempted even if the first fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let access = self.store.remove(ACCESS_COOKIE);
        let refresh = self.store.remove(REFRESH_COOKIE);
        debug!("session credentials cleared");
        access.and(refresh)
    }

    /// Whether a usable access token is present. Storage errors count as absent.
    pub fn is_authenticated(&self) -> bool {
        match self.access_token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!("failed to read session: {e}");
                false
            }
        }
    }

    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let cookie = StoredCookie {
            value: value.to_string(),
            expires_at,
        };
        save_json(self.store.as_ref(), name, &cookie)
    }

    fn cookie(&self, name: &str) -> Result<Option<String>, StorageError> {
        let Some(cookie) = load_json::<StoredCookie>(self.store.as_ref(), name)? else {
            return Ok(None);
        };
        if cookie.expires_at <= Utc::now() {
            debug!("cookie {name} expired at {}", cookie.expires_at);
            return Ok(None);
        }
        Ok(Some(cookie.value))
    }
}

/// Outcome of the OAuth callback redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Both tokens were present.
    Authenticated(Credentials),
    /// The identity provider reported an error.
    Failed(String),
    /// Neither an error nor a complete token pair.
    MissingTokens,
}

impl CallbackOutcome {
    /// Classify the callback from its `access_token`, `refresh_token` and
    /// `error` query parameters.
    pub fn from_url(url: &Url) -> Self {
        let mut access_token = None;
        let mut refresh_token = None;
        let mut error = None;

        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error.filter(|e| !e.is_empty()) {
            return CallbackOutcome::Failed(error);
        }

        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                CallbackOutcome::Authenticated(Credentials {
                    access_token,
                    refresh_token,
                })
            }
            _ => CallbackOutcome::MissingTokens,
        }
    }

    /// Where the user should be sent next.
    pub fn redirect_target(&self) -> String {
        match self {
            CallbackOutcome::Authenticated(_) => SERVERS_PATH.to_string(),
            CallbackOutcome::Failed(error) => {
                let mut target = String::from(LOGIN_PATH);
                target.push_str("?error=");
                target.extend(url::form_urlencoded::byte_serialize(error.as_bytes()));
                target
            }
            CallbackOutcome::MissingTokens => format!("{LOGIN_PATH}?error=missing_tokens"),
        }
    }

    /// Persist the credentials of a successful callback and return the redirect.
    pub fn complete(&self, session: &SessionStore) -> Result<String, StorageError> {
        if let CallbackOutcome::Authenticated(credentials) = self {
            session.save(credentials)?;
        }
        Ok(self.redirect_target())
    }
}

/// The login entry point on the API (`<base>/login`).
pub fn login_url(base_url: &str) -> String {
    format!("{}{LOGIN_PATH}", base_url.trim_end_matches('/'))
}
