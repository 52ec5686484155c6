// gateway/src/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use models::{
    AuthSession, AuthUser, HmsError, HmsResult, Profile, ProfilePatch, SignUpOutcome,
    SignUpRequest,
};

use crate::config::GatewayConfig;
use crate::query::SelectQuery;
use crate::{AuthApi, TableApi};

const PROFILES_TABLE: &str = "profiles";

/// The hosted Gateway over HTTP. Table operations live under
/// `/rest/v1/{table}`, auth operations under `/auth/v1`. The current
/// access token is held in-process and stands in for the browser SDK's
/// persisted session: requests carry it as the bearer once a session is
/// active, and fall back to the api key otherwise.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<AuthSession>>,
}

/// Session payload shared by the sign-in, sign-up, and OTP endpoints. The
/// token is absent when the Gateway demands email verification first.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> HmsResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HmsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpGateway {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            session: RwLock::new(None),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.api_key.clone(),
        }
    }

    async fn store_session(&self, session: AuthSession) {
        *self.session.write().await = Some(session);
    }

    /// The Gateway's human-readable message field, whichever name it used.
    async fn error_message(resp: Response) -> String {
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or_default();
        for field in ["message", "error_description", "msg", "error"] {
            if let Some(message) = body.get(field).and_then(Value::as_str) {
                return message.to_string();
            }
        }
        format!("Gateway returned status {}", status)
    }

    fn transport(err: reqwest::Error) -> HmsError {
        HmsError::Network(format!("Request to the Gateway failed: {}", err))
    }

    /// Parses a session payload that must carry a usable token.
    async fn require_session(resp: Response) -> HmsResult<AuthSession> {
        let payload: SessionPayload = resp
            .json()
            .await
            .map_err(|e| HmsError::Auth(format!("Malformed session payload: {}", e)))?;
        match (payload.access_token, payload.user) {
            (Some(access_token), Some(user)) => Ok(AuthSession { access_token, user }),
            _ => Err(HmsError::Auth(
                "Gateway returned no usable session".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TableApi for HttpGateway {
    async fn select(&self, table: &str, query: &SelectQuery) -> HmsResult<Vec<Value>> {
        let mut url = self.rest_url(table);
        let params = query.to_query_string();
        if !params.is_empty() {
            url = format!("{}?{}", url, params);
        }
        debug!(table, %url, "selecting rows");

        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| HmsError::DataAccess(format!("Malformed row payload: {}", e)))
    }

    async fn count(&self, table: &str) -> HmsResult<u64> {
        debug!(table, "counting rows");
        let resp = self
            .http
            .get(format!("{}?select=id", self.rest_url(table)))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() && resp.status() != StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }

        // Content-Range arrives as "0-0/17" (or "*/0" for an empty table).
        let total = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok());
        total.ok_or_else(|| {
            HmsError::DataAccess("Gateway response carried no row count".to_string())
        })
    }

    async fn insert(&self, table: &str, row: Value) -> HmsResult<Value> {
        debug!(table, "inserting row");
        let resp = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }
        let mut rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| HmsError::DataAccess(format!("Malformed row payload: {}", e)))?;
        if rows.is_empty() {
            return Err(HmsError::DataAccess(format!(
                "Insert into {} returned no row",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    async fn update(&self, table: &str, id: Uuid, patch: Value) -> HmsResult<()> {
        debug!(table, %id, "updating row");
        let resp = self
            .http
            .patch(format!("{}?id=eq.{}", self.rest_url(table), id))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }
        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| HmsError::DataAccess(format!("Malformed row payload: {}", e)))?;
        if rows.is_empty() {
            return Err(HmsError::DataAccess(format!(
                "No {} row with id {}",
                table, id
            )));
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: Uuid) -> HmsResult<()> {
        debug!(table, %id, "deleting row");
        let resp = self
            .http
            .delete(format!("{}?id=eq.{}", self.rest_url(table), id))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }
        // The Gateway reports success even when nothing matched; an empty
        // representation is how a missing id shows up.
        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| HmsError::DataAccess(format!("Malformed row payload: {}", e)))?;
        if rows.is_empty() {
            return Err(HmsError::DataAccess(format!(
                "No {} row with id {} to delete",
                table, id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for HttpGateway {
    async fn sign_in(&self, email: &str, password: &str) -> HmsResult<AuthSession> {
        debug!(email, "signing in");
        let resp = self
            .http
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::Auth(Self::error_message(resp).await));
        }
        let session = Self::require_session(resp).await?;
        self.store_session(session.clone()).await;
        Ok(session)
    }

    async fn sign_up(&self, req: SignUpRequest) -> HmsResult<SignUpOutcome> {
        debug!(email = %req.email, "signing up");
        let resp = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": req.email,
                "password": req.password,
                "name": req.name,
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::Auth(Self::error_message(resp).await));
        }
        let payload: SessionPayload = resp
            .json()
            .await
            .map_err(|e| HmsError::Auth(format!("Malformed session payload: {}", e)))?;
        match (payload.access_token, payload.user) {
            (Some(access_token), Some(user)) => {
                let session = AuthSession { access_token, user };
                self.store_session(session.clone()).await;
                Ok(SignUpOutcome::Active(session))
            }
            _ => Ok(SignUpOutcome::VerificationRequired { email: req.email }),
        }
    }

    async fn current_session(&self) -> HmsResult<Option<AuthSession>> {
        let Some(held) = self.session.read().await.clone() else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(&held.access_token)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            // Expired or revoked token; not an error, just no session.
            debug!(status = %resp.status(), "held token rejected");
            *self.session.write().await = None;
            return Ok(None);
        }
        let user: AuthUser = resp
            .json()
            .await
            .map_err(|e| HmsError::Auth(format!("Malformed session payload: {}", e)))?;
        let session = AuthSession {
            access_token: held.access_token,
            user,
        };
        self.store_session(session.clone()).await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> HmsResult<()> {
        // Drop the local token first so the session is gone regardless of
        // how the revocation call goes.
        let Some(held) = self.session.write().await.take() else {
            return Ok(());
        };

        let resp = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(&held.access_token)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::Auth(Self::error_message(resp).await));
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> HmsResult<Option<Profile>> {
        debug!(%user_id, "fetching profile");
        let resp = self
            .http
            .get(format!("{}?id=eq.{}", self.rest_url(PROFILES_TABLE), user_id))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::DataAccess(Self::error_message(resp).await));
        }
        let mut rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| HmsError::DataAccess(format!("Malformed row payload: {}", e)))?;
        if rows.is_empty() {
            return Ok(None);
        }
        let profile: Profile = serde_json::from_value(rows.remove(0))?;
        Ok(Some(profile))
    }

    async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> HmsResult<()> {
        debug!(%user_id, "updating profile");
        let patch = serde_json::to_value(&patch)?;
        TableApi::update(self, PROFILES_TABLE, user_id, patch).await
    }

    async fn verify_otp(&self, email: &str, code: &str) -> HmsResult<AuthSession> {
        debug!(email, "verifying email OTP");
        let resp = self
            .http
            .post(self.auth_url("verify"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "token": code, "type": "signup" }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(HmsError::Auth(Self::error_message(resp).await));
        }
        let session = Self::require_session(resp).await?;
        self.store_session(session.clone()).await;
        Ok(session)
    }

    async fn resend_otp(&self, email: &str) -> HmsResult<()> {
        debug!(email, "resending email OTP");
        let resp = self
            .http
            .post(self.auth_url("resend"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "type": "signup" }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            warn!(email, "OTP resend rejected by the Gateway");
            return Err(HmsError::Auth(Self::error_message(resp).await));
        }
        Ok(())
    }
}
