//! Supabase REST client
//!
//! - Identity: `/auth/v1/user` with the caller's JWT, `is_admin` RPC under that JWT
//! - Data: `/rest/v1/members` and `/rest/v1/rpc/<fn>` under the service-role key
//!
//! Falls back to the anon key when no service-role key is configured; RLS then
//! applies to every data call.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Member, PasswordUpdate, SessionUser};
use crate::modules::db::{IdentityProvider, MemberStore, RemoteProcedures};

const MEMBERS_TABLE: &str = "members";
const MEMBER_COLUMNS: &str = "id,email,first_name,last_name";
const IS_ADMIN_FN: &str = "is_admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default)]
    pub service_role_key: Option<String>,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            service_role_key: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Supabase request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected Supabase response: {0}")]
    Decode(String),
}

impl SupabaseError {
    /// PostgREST reports an unknown RPC as PGRST202; Postgres itself as 42883
    pub fn is_missing_function(&self) -> bool {
        match self {
            Self::Api { code: Some(code), .. } => code == "PGRST202" || code == "42883",
            _ => false,
        }
    }

    /// Postgres rejected the id literal (e.g. not a uuid)
    fn is_invalid_id(&self) -> bool {
        matches!(self, Self::Api { code: Some(code), .. } if code == "22P02")
    }
}

/// PostgREST and GoTrue error bodies use different field names
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<Value>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    details: Option<String>,
}

pub struct SupabaseClient {
    http_client: Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(http_client: Client, config: SupabaseConfig) -> Self {
        if config.service_role_key.is_none() {
            tracing::warn!("SUPABASE_SERVICE_ROLE_KEY not set, data calls will use the anon key");
        }
        Self {
            http_client,
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn service_key(&self) -> &str {
        self.config
            .service_role_key
            .as_deref()
            .unwrap_or(&self.config.anon_key)
    }

    /// Request authorized as the caller (anon apikey + user JWT)
    fn as_user(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
    }

    /// Request authorized with the privileged key
    fn as_service(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.service_key();
        builder.header("apikey", key).bearer_auth(key)
    }

    async fn check(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let code = body.code.map(|c| match c {
            Value::String(s) => s,
            other => other.to_string(),
        });
        let message = body
            .message
            .or(body.msg)
            .or(body.error_description)
            .or(body.details)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("Supabase returned {}", status)
                } else {
                    format!("Supabase returned {}: {}", status, text)
                }
            });

        Err(SupabaseError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn read_json(response: Response) -> Result<Value, SupabaseError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SupabaseError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn validate_session(
        &self,
        access_token: &str,
    ) -> Result<Option<SessionUser>, SupabaseError> {
        let response = self
            .as_user(self.http_client.get(self.endpoint("/auth/v1/user")), access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user = Self::check(response)
            .await?
            .json::<SessionUser>()
            .await
            .map_err(|e| SupabaseError::Decode(e.to_string()))?;
        Ok(Some(user))
    }

    async fn is_admin(
        &self,
        access_token: &str,
        user: &SessionUser,
    ) -> Result<bool, SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/rpc/{}", IS_ADMIN_FN));
        let response = self
            .as_user(self.http_client.post(url), access_token)
            .json(&json!({ "user_id": user.id }))
            .send()
            .await?;

        match Self::read_json(Self::check(response).await?).await? {
            Value::Bool(is_admin) => Ok(is_admin),
            other => Err(SupabaseError::Decode(format!(
                "{} returned {}",
                IS_ADMIN_FN, other
            ))),
        }
    }
}

#[async_trait]
impl MemberStore for SupabaseClient {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>, SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{}", MEMBERS_TABLE));
        let response = self
            .as_service(self.http_client.get(url))
            .query(&[
                ("id", format!("eq.{}", member_id)),
                ("select", MEMBER_COLUMNS.to_string()),
            ])
            .send()
            .await?;

        let response = match Self::check(response).await {
            Ok(r) => r,
            Err(e) if e.is_invalid_id() => return Ok(None),
            Err(e) => return Err(e),
        };

        let rows: Vec<Member> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Decode(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    async fn update_password(
        &self,
        member_id: &str,
        update: &PasswordUpdate,
    ) -> Result<bool, SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/{}", MEMBERS_TABLE));
        let response = self
            .as_service(self.http_client.patch(url))
            .query(&[
                ("id", format!("eq.{}", member_id)),
                ("select", "id".to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;

        // PostgREST answers a PATCH that matched nothing with 200 and `[]`
        let rows: Vec<Value> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SupabaseError::Decode(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl RemoteProcedures for SupabaseClient {
    async fn call(&self, function: &str, params: Value) -> Result<Value, SupabaseError> {
        let url = self.endpoint(&format!("/rest/v1/rpc/{}", function));
        tracing::debug!("Supabase RPC {}", function);

        let response = self
            .as_service(self.http_client.post(url))
            .json(&params)
            .send()
            .await?;

        Self::read_json(Self::check(response).await?).await
    }
}
