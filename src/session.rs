#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::config::Config;
use crate::error::{Result, SpecsError};

/// The signed-in person, as reported by Google.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Full display name
    #[serde(default)]
    pub name: String,

    /// Primary email address
    #[serde(default)]
    pub email: String,
}

/// User session data
///
/// Represents an authenticated user session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user
    pub user: SessionUser,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// Global sessions storage
///
/// Stores all active user sessions in a thread-safe map.
lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
}

// Constants
pub const SESSION_COOKIE: &str = "session";
const STATE_COOKIE: &str = "oauth_state";
const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Create a new user session
///
/// Creates and stores a new session for an authenticated user, dropping
/// sessions that have already expired.
///
/// # Arguments
/// * `user` - The user to create a session for
///
/// # Returns
/// * `String` - A unique session ID
pub fn create_session(user: SessionUser) -> String {
    let session_id = Uuid::new_v4().to_string();
    let now = SystemTime::now();
    let session = Session {
        user,
        expires_at: now + Duration::from_secs(SESSION_DURATION),
    };

    let mut sessions = SESSIONS.write().unwrap_or_else(|e| e.into_inner());
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(session_id.clone(), session);

    session_id
}

/// Validate a session
///
/// Checks if a session is valid and not expired.
///
/// # Arguments
/// * `session_id` - The session ID to validate
///
/// # Returns
/// * `Option<SessionUser>` - The user for the session if valid, None otherwise
pub fn validate_session(session_id: &str) -> Option<SessionUser> {
    let sessions = SESSIONS.read().unwrap_or_else(|e| e.into_inner());

    sessions
        .get(session_id)
        .filter(|session| session.expires_at > SystemTime::now())
        .map(|session| session.user.clone())
}

/// Forget a session
pub fn end_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap_or_else(|e| e.into_inner());
    sessions.remove(session_id);
}

/// Google OAuth2 web-server flow
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl OAuthClient {
    /// Build the client when both OAuth credentials are configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let (Some(client_id), Some(client_secret)) = (
            config.google_oauth_client_id.as_ref(),
            config.google_oauth_client_secret.as_ref(),
        ) else {
            return Ok(None);
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Some(OAuthClient {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            redirect_url: config.callback_url(),
            http,
        }))
    }

    /// Consent screen URL carrying `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code and look up who signed in.
    pub fn fetch_user(&self, code: &str) -> Result<SessionUser> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()?;
        if !response.status().is_success() {
            return Err(SpecsError::Api {
                endpoint: TOKEN_URL.to_string(),
                status: response.status().as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        let token: TokenResponse = response.json()?;

        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()?;
        if !response.status().is_success() {
            return Err(SpecsError::Api {
                endpoint: USERINFO_URL.to_string(),
                status: response.status().as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.json()?)
    }
}

/// Query string Google sends back to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// Start Google sign-in
///
/// Stores a random state value in a cookie and redirects to the consent screen.
///
/// # Returns
/// * `Response` - Redirect to Google, or 503 when sign-in is not configured
pub async fn handle_login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(oauth) = state.oauth.as_ref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Sign-in is not configured").into_response();
    };

    let oauth_state = Uuid::new_v4().to_string();
    let cookie = Cookie::build((STATE_COOKIE, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to(&oauth.authorize_url(&oauth_state))).into_response()
}

/// Finish Google sign-in
///
/// Checks the state value, exchanges the code, creates a session and
/// redirects to the user's own specs.
///
/// # Arguments
/// * `jar` - Cookie jar holding the state cookie
/// * `params` - Authorization code and state from Google
///
/// # Returns
/// * `Response` - Redirect to `/my-specs` with a session cookie, or an error
pub async fn handle_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if params.code.is_empty() || expected.as_deref() != Some(params.state.as_str()) {
        return (StatusCode::BAD_REQUEST, "Invalid sign-in response").into_response();
    }

    let app = state.clone();
    let code = params.code;
    let user = tokio::task::spawn_blocking(move || match app.oauth.as_ref() {
        Some(oauth) => oauth.fetch_user(&code),
        None => Err(SpecsError::Config("sign-in is not configured".to_string())),
    })
    .await;

    let user = match user {
        Ok(Ok(user)) => user,
        Ok(Err(e)) => {
            log::error!("google sign-in failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Sign-in failed").into_response();
        }
        Err(e) => {
            log::error!("google sign-in task failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Sign-in failed").into_response();
        }
    };

    log::info!("signed in {}", user.email);
    let session_id = create_session(user);
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    let jar = jar
        .remove(Cookie::build(STATE_COOKIE).path("/"))
        .add(cookie);

    (jar, Redirect::to("/my-specs")).into_response()
}

/// Handle user logout
///
/// Ends the session, clears the session cookie and redirects to the listing.
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        end_session(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    (jar, Redirect::to("/"))
}

/// Authentication middleware
///
/// Lets the request through with the signed-in [`SessionUser`] attached as an
/// extension, or redirects to sign-in.
///
/// # Arguments
/// * `jar` - Cookie jar containing session information
/// * `request` - The incoming request
/// * `next` - Next middleware in the chain
///
/// # Returns
/// * `Response` - Either passes the request through or redirects to sign-in
pub async fn require_auth(
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Some(user) = validate_session(session_cookie.value()) {
            request.extensions_mut().insert(user);
            return next.run(request).await;
        }
    }

    Redirect::to("/auth/google/login").into_response()
}
