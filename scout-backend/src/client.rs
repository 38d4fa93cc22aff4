//! Supabase-style REST client.
//!
//! Signs in once with email + password, keeps the access token, and refreshes
//! it shortly before it expires. Table reads go through PostgREST
//! (`/rest/v1/<table>`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;

use crate::errors::{BackendError, Result};
use crate::model::{AuthErrorBody, Product, Session, TokenResponse};
use crate::source::ProductSource;

/// Refresh the access token when it expires within this many seconds.
pub const REFRESH_MARGIN_SECS: i64 = 30;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Config ───────────────────────────────────────────────────────────────────

/// Connection and sign-in parameters.
#[derive(Debug)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url:      String,
    /// Public (anon) API key, sent as the `apikey` header.
    pub api_key:  SecretString,
    pub email:    String,
    pub password: SecretString,
}

// ─── URLs ─────────────────────────────────────────────────────────────────────

fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// `POST` target for the given grant (`password` or `refresh_token`).
pub fn token_url(url: &str, grant: &str) -> String {
    format!("{}/auth/v1/token?grant_type={grant}", base(url))
}

/// `GET` target returning every row of `table`, ordered by ID.
pub fn table_url(url: &str, table: &str) -> String {
    format!("{}/rest/v1/{table}?select=*&order=id.asc", base(url))
}

// ─── Token ────────────────────────────────────────────────────────────────────

struct Token {
    access:     SecretString,
    refresh:    SecretString,
    expires_at: DateTime<Utc>,
}

impl Token {
    fn from_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = resp.expiry(now);
        Self {
            access: SecretString::from(resp.access_token),
            refresh: SecretString::from(resp.refresh_token),
            expires_at,
        }
    }

    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= TimeDelta::seconds(REFRESH_MARGIN_SECS)
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// A signed-in backend session.
pub struct SupabaseClient {
    http:   reqwest::Client,
    config: BackendConfig,
    token:  Mutex<Token>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("url", &self.config.url)
            .field("email", &self.config.email)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Build the HTTP client and sign in with the configured credentials.
    pub async fn sign_in(config: BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let body  = json!({ "email": config.email, "password": config.password.expose_secret() });
        let token = request_token(&http, &config, "password", &body).await?;
        log::info!("signed in to backend as {}", config.email);

        Ok(Self { http, config, token: Mutex::new(token) })
    }

    /// A valid access token, refreshing (or signing in again) when close to expiry.
    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if !token.needs_refresh(Utc::now()) {
            return Ok(token.access.expose_secret().to_string());
        }

        log::debug!("backend token expires at {}, refreshing", token.expires_at);
        let body = json!({ "refresh_token": token.refresh.expose_secret() });
        *token = match request_token(&self.http, &self.config, "refresh_token", &body).await {
            Ok(t) => t,
            Err(e) => {
                log::warn!("token refresh failed ({e}), signing in again");
                let body = json!({
                    "email":    self.config.email,
                    "password": self.config.password.expose_secret(),
                });
                request_token(&self.http, &self.config, "password", &body).await?
            }
        };
        Ok(token.access.expose_secret().to_string())
    }

    /// Every row of `table`, ordered by ID.
    pub async fn select<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let access = self.access_token().await?;
        let resp = self.http
            .get(table_url(&self.config.url, table))
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(access)
            .send()
            .await?;

        let resp  = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        log::debug!("fetched {} row(s) from {table}", rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl ProductSource for SupabaseClient {
    async fn products(&self) -> Result<Vec<Product>> {
        self.select("products").await
    }

    async fn sessions(&self) -> Result<Vec<Session>> {
        self.select("sessions").await
    }
}

async fn request_token(
    http:   &reqwest::Client,
    config: &BackendConfig,
    grant:  &str,
    body:   &serde_json::Value,
) -> Result<Token> {
    let resp = http
        .post(token_url(&config.url, grant))
        .header("apikey", config.api_key.expose_secret())
        .json(body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text   = resp.text().await.unwrap_or_default();
        let msg = serde_json::from_str::<AuthErrorBody>(&text)
            .ok()
            .and_then(AuthErrorBody::message)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(BackendError::Auth(msg));
    }

    let parsed: TokenResponse = resp.json().await?;
    Ok(Token::from_response(parsed, Utc::now()))
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body   = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status,
        body: body.chars().take(200).collect(),
    })
}
