// In-memory identity + database backend for handler tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Member, PasswordUpdate, SessionUser};
use crate::modules::db::{
    IdentityProvider, MemberStore, RemoteProcedures, DISABLE_RLS_FN, EXEC_SQL_FN,
    GENERATE_TOKEN_FN, INVALIDATE_TOKENS_FN,
};
use crate::modules::supabase::SupabaseError;

/// Key used with `failing_function` to make password persistence fail
pub const UPDATE_PASSWORD_OP: &str = "members:update";

#[derive(Default)]
pub struct InMemoryBackend {
    members: HashMap<String, Member>,
    sessions: HashMap<String, SessionUser>,
    admins: HashSet<String>,
    vanished: HashSet<String>,
    failing: HashMap<String, String>,
    missing_functions: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    invalidated: Mutex<Vec<String>>,
    rls_disabled: Mutex<Vec<String>>,
    password_updates: Mutex<Vec<(String, PasswordUpdate)>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: &str, first: &str, last: &str, email: &str) -> Self {
        self.members.insert(
            id.to_string(),
            Member {
                id: id.to_string(),
                email: Some(email.to_string()),
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
            },
        );
        self
    }

    pub fn with_session(mut self, token: &str, user_id: &str) -> Self {
        self.sessions.insert(
            token.to_string(),
            SessionUser {
                id: user_id.to_string(),
                email: Some(format!("{}@example.org", user_id)),
            },
        );
        self
    }

    pub fn with_admin(mut self, token: &str, user_id: &str) -> Self {
        self.admins.insert(user_id.to_string());
        self.with_session(token, user_id)
    }

    /// Member is still found by lookup but gone by the time it is updated
    pub fn vanishing_after_lookup(mut self, id: &str) -> Self {
        self.vanished.insert(id.to_string());
        self
    }

    pub fn without_function(self, name: &str) -> Self {
        self.missing_functions
            .lock()
            .unwrap()
            .insert(name.to_string());
        self
    }

    pub fn failing_function(mut self, name: &str, message: &str) -> Self {
        self.failing.insert(name.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }

    pub fn rls_disabled(&self) -> Vec<String> {
        self.rls_disabled.lock().unwrap().clone()
    }

    pub fn password_updates(&self) -> Vec<(String, PasswordUpdate)> {
        self.password_updates.lock().unwrap().clone()
    }

    fn failure(&self, op: &str) -> Option<SupabaseError> {
        self.failing.get(op).map(|message| SupabaseError::Api {
            status: 400,
            code: Some("P0001".to_string()),
            message: message.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn validate_session(
        &self,
        access_token: &str,
    ) -> Result<Option<SessionUser>, SupabaseError> {
        Ok(self.sessions.get(access_token).cloned())
    }

    async fn is_admin(
        &self,
        _access_token: &str,
        user: &SessionUser,
    ) -> Result<bool, SupabaseError> {
        if let Some(err) = self.failure("is_admin") {
            return Err(err);
        }
        Ok(self.admins.contains(&user.id))
    }
}

#[async_trait]
impl MemberStore for InMemoryBackend {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>, SupabaseError> {
        Ok(self.members.get(member_id).cloned())
    }

    async fn update_password(
        &self,
        member_id: &str,
        update: &PasswordUpdate,
    ) -> Result<bool, SupabaseError> {
        if let Some(err) = self.failure(UPDATE_PASSWORD_OP) {
            return Err(err);
        }
        if self.vanished.contains(member_id) {
            return Ok(false);
        }
        self.password_updates
            .lock()
            .unwrap()
            .push((member_id.to_string(), update.clone()));
        Ok(true)
    }
}

#[async_trait]
impl RemoteProcedures for InMemoryBackend {
    async fn call(&self, function: &str, params: Value) -> Result<Value, SupabaseError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(function.to_string());
            calls.len()
        };

        if let Some(err) = self.failure(function) {
            return Err(err);
        }
        if self.missing_functions.lock().unwrap().contains(function) {
            return Err(SupabaseError::Api {
                status: 404,
                code: Some("PGRST202".to_string()),
                message: format!("Could not find the function public.{}", function),
            });
        }

        match function {
            GENERATE_TOKEN_FN => Ok(Value::String(format!(
                "tok_{}_{}_{}",
                params["p_member_id"].as_str().unwrap_or_default(),
                params["p_days_valid"],
                call_index
            ))),
            INVALIDATE_TOKENS_FN => {
                self.invalidated.lock().unwrap().push(
                    params["p_member_id"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                );
                Ok(Value::Null)
            }
            DISABLE_RLS_FN => {
                self.rls_disabled.lock().unwrap().push(
                    params["table_name"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                );
                Ok(Value::Null)
            }
            EXEC_SQL_FN => {
                let sql = params["sql"].as_str().unwrap_or_default();
                if sql.contains(DISABLE_RLS_FN) {
                    self.missing_functions.lock().unwrap().remove(DISABLE_RLS_FN);
                }
                Ok(Value::Null)
            }
            other => Err(SupabaseError::Api {
                status: 404,
                code: Some("PGRST202".to_string()),
                message: format!("Could not find the function public.{}", other),
            }),
        }
    }
}
