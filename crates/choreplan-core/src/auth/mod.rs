//! Authentication against the `/api/auth` endpoints.
//!
//! `AuthService` owns the [`SessionStore`]: login persists the token +
//! user id pair, logout clears it, and any 401 seen by the service
//! clears it as well (the backend has already invalidated us, so the
//! stale credential must not outlive the response).

mod session;

pub use session::{Session, SessionStore};

use serde::{Deserialize, Serialize};

use crate::api::{self, ApiClient};
use crate::error::{ApiError, CoreError, ValidationError};

/// User profile as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Profile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignupRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidValue {
                field: "email",
                message: "not an email address".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}

/// Partial update for `PUT /auth/update-profile`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "userId")]
    user_id: String,
}

/// Login/signup/logout/profile operations, owning the session store.
pub struct AuthService {
    api: ApiClient,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(api: ApiClient, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    /// A clone of the session store, for injecting into other services.
    pub fn sessions(&self) -> SessionStore {
        self.sessions.clone()
    }

    /// The current session, if one is persisted.
    pub fn session(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.sessions.load()?)
    }

    /// Register a new account. Does not establish a session.
    pub fn signup(&self, request: &SignupRequest) -> Result<(), CoreError> {
        request.validate()?;
        api::wait(
            self.api
                .post_unit("/auth/signup", Some(request), None),
        )?;
        Ok(())
    }

    /// Authenticate, persist the session, and return the profile.
    pub fn login(&self, email: &str, password: &str) -> Result<Profile, CoreError> {
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        let response: LoginResponse = api::wait(self.api.post_json(
            "/auth/login",
            &LoginRequest { email, password },
            None,
        ))?;

        let session = Session {
            token: response.token,
            user_id: response.user_id,
        };
        self.sessions.save(&session)?;

        self.guard_401(self.fetch_user(&session.user_id))
    }

    /// Drop the persisted session. Purely client-side.
    pub fn logout(&self) -> Result<(), CoreError> {
        Ok(self.sessions.clear()?)
    }

    /// The authenticated user's profile via `GET /auth/me`, or `None`
    /// when no session exists (including one the backend just refused).
    pub fn current_user(&self) -> Result<Option<Profile>, CoreError> {
        let Some(session) = self.sessions.load()? else {
            return Ok(None);
        };
        match api::wait(
            self.api
                .get_json("/auth/me", &[], Some(&session.token)),
        ) {
            Ok(profile) => Ok(Some(profile)),
            Err(ApiError::Unauthorized) => {
                self.sessions.clear()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a profile by user id via `GET /auth/user/{id}`.
    pub fn fetch_user(&self, user_id: &str) -> Result<Profile, CoreError> {
        let token = self.sessions.load()?.map(|s| s.token);
        let path = format!("/auth/user/{user_id}");
        self.guard_401(
            api::wait(self.api.get_json(&path, &[], token.as_deref())).map_err(Into::into),
        )
    }

    /// Update the authenticated user's profile.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, CoreError> {
        let Some(session) = self.sessions.load()? else {
            return Err(ApiError::Unauthorized.into());
        };
        self.guard_401(
            api::wait(self.api.put_json(
                "/auth/update-profile",
                update,
                Some(&session.token),
            ))
            .map_err(Into::into),
        )
    }

    /// A 401 anywhere means the persisted session is dead: clear it
    /// before handing the error back.
    fn guard_401<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(CoreError::Api(ApiError::Unauthorized)) = &result {
            if let Err(e) = self.sessions.clear() {
                eprintln!("Warning: failed to clear session after 401: {e}");
            }
        }
        result
    }
}
