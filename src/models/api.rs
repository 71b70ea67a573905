use serde::{Deserialize, Serialize};

/// Error detail carried inside the response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

/// Failure envelope: `{ "success": false, "error": { "message": ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

/// Success envelope; route-specific fields are flattened next to `success`
#[derive(Debug, Clone, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenIssued {
    pub token: String,
    pub member: MemberIdentity,
    pub expires_in_days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageOnly {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordAssigned {
    pub password: String,
    pub member: MemberIdentity,
    pub message: String,
}

/// Member id + display fields echoed back by the credential routes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
}
