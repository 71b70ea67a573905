//! Database seams.
//!
//! The gateway never talks SQL. Everything goes through three small traits so
//! handlers can run against Supabase in production and an in-memory backend in
//! tests:
//! - [`IdentityProvider`]: resolve an access token, check the admin predicate
//! - [`MemberStore`]: read a member, write password fields
//! - [`RemoteProcedures`]: named RPC calls with JSON parameters

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::{Member, PasswordUpdate, SessionUser};
use crate::modules::supabase::SupabaseError;

pub const GENERATE_TOKEN_FN: &str = "generate_member_token";
pub const INVALIDATE_TOKENS_FN: &str = "invalidate_member_tokens";
pub const DISABLE_RLS_FN: &str = "disable_rls_for_table";
pub const EXEC_SQL_FN: &str = "exec_sql";

/// SQL installed through `exec_sql` when `disable_rls_for_table` is missing.
/// The trailing NOTIFY makes PostgREST reload its schema cache so the retry can see it.
pub const CREATE_DISABLE_RLS_SQL: &str = r#"
CREATE OR REPLACE FUNCTION public.disable_rls_for_table(table_name text)
RETURNS void
LANGUAGE plpgsql
SECURITY DEFINER
SET search_path = public
AS $$
BEGIN
  EXECUTE format('ALTER TABLE public.%I DISABLE ROW LEVEL SECURITY', table_name);
END;
$$;
NOTIFY pgrst, 'reload schema';
"#;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the token is unknown or expired
    async fn validate_session(&self, access_token: &str)
        -> Result<Option<SessionUser>, SupabaseError>;

    async fn is_admin(&self, access_token: &str, user: &SessionUser)
        -> Result<bool, SupabaseError>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>, SupabaseError>;

    /// Returns `false` when no row matched, e.g. the member was deleted after lookup
    async fn update_password(
        &self,
        member_id: &str,
        update: &PasswordUpdate,
    ) -> Result<bool, SupabaseError>;
}

#[async_trait]
pub trait RemoteProcedures: Send + Sync {
    async fn call(&self, function: &str, params: Value) -> Result<Value, SupabaseError>;
}

/// Issue a token for `member_id` valid for `days_valid` days
pub async fn generate_member_token(
    rpc: &dyn RemoteProcedures,
    member_id: &str,
    days_valid: u32,
) -> Result<String, SupabaseError> {
    let value = rpc
        .call(
            GENERATE_TOKEN_FN,
            json!({ "p_member_id": member_id, "p_days_valid": days_valid }),
        )
        .await?;

    match value {
        Value::String(token) if !token.is_empty() => Ok(token),
        Value::Object(ref map) => map
            .get("token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| SupabaseError::Decode(format!("{} returned {}", GENERATE_TOKEN_FN, value))),
        other => Err(SupabaseError::Decode(format!(
            "{} returned {}",
            GENERATE_TOKEN_FN, other
        ))),
    }
}

pub async fn invalidate_member_tokens(
    rpc: &dyn RemoteProcedures,
    member_id: &str,
) -> Result<(), SupabaseError> {
    rpc.call(INVALIDATE_TOKENS_FN, json!({ "p_member_id": member_id }))
        .await?;
    Ok(())
}

/// Disable RLS on `table`, installing the helper function first if the database lacks it.
///
/// Retries exactly once after installing; any other failure is returned as is.
pub async fn disable_rls_with_bootstrap(
    rpc: &dyn RemoteProcedures,
    table: &str,
) -> Result<(), SupabaseError> {
    let params = json!({ "table_name": table });

    match rpc.call(DISABLE_RLS_FN, params.clone()).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_missing_function() => {
            tracing::warn!(
                "{} is missing, installing it before retrying: {}",
                DISABLE_RLS_FN,
                e
            );
            rpc.call(EXEC_SQL_FN, json!({ "sql": CREATE_DISABLE_RLS_SQL }))
                .await?;
            rpc.call(DISABLE_RLS_FN, params).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
