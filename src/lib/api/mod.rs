//! Typed access to the backend's REST endpoints.
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::session::{SessionStore, UserCache};

pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod models;

pub use envelope::Envelope;
pub use error::ApiError;

use models::{LoginRequest, LoginResponse, ProfileUpdate, UserProfile};

pub struct ApiClient {
    base_url: String,
    http: Client,
    token: Mutex<Option<String>>,
    session: SessionStore,
}

impl ApiClient {
    /// Builds a client and picks up a previously persisted token.
    pub fn new(base_url: &str, session: SessionStore) -> Self {
        let token = match session.load() {
            Ok(token) => token,
            Err(err) => {
                warn!("Ignoring unreadable session {}: {}", session.path().display(), err);
                None
            }
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http: Client::new(),
            token: Mutex::new(token),
            session,
        }
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token_slot().is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match self.token_slot().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Drops the token after the backend refused it.
    fn expire_session(&self) {
        self.token_slot().take();
        if let Err(err) = self.session.clear() {
            warn!("Could not remove session file: {}", err);
        }
    }

    async fn execute<T>(&self, builder: RequestBuilder, path: &str) -> Result<Envelope<T>, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED && !path.starts_with("/auth/") {
            warn!("Backend refused the session token on {}", path);
            self.expire_session();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(envelope::classify_failure(status, &body));
        }
        envelope::decode(&body)
    }

    pub(crate) async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.execute::<T>(builder, path).await?.into_data()
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let builder = self.request(method, path).json(body);
        self.execute(builder, path).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        info!("Logging in as {}", email);
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let login: LoginResponse = self
            .send_json(Method::POST, "/auth/login", &body)
            .await?
            .into_data()?;
        if let Err(err) = self.session.save(&login.token) {
            warn!("Could not persist session: {}", err);
        }
        *self.token_slot() = Some(login.token);
        Ok(login.user)
    }

    pub fn logout(&self, cache: &mut UserCache) {
        info!("Logging out");
        cache.invalidate();
        self.expire_session();
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/users/profile", &[]).await
    }

    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        cache: &mut UserCache,
    ) -> Result<UserProfile, ApiError> {
        let result = self
            .send_json::<_, UserProfile>(Method::PATCH, "/users/profile", update)
            .await
            .and_then(Envelope::into_data);
        cache.invalidate();
        let profile = result?;
        cache.store(profile.clone());
        Ok(profile)
    }
}
