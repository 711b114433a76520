// Operator entity
// Staff accounts that attribute check-ins, collections and hand-outs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::OperatorId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: OperatorId,
    pub username: String,
    pub display_name: String,
    pub counter_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored form of an operator. Never leaves the storage and auth layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperatorAccount {
    #[serde(flatten)]
    pub operator: Operator,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInput {
    pub username: String,
    pub display_name: Option<String>,
    pub counter_name: Option<String>,
    pub password: String,
}

/// Roster entry as written by hand in `operators.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OperatorSeed {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub counter_name: Option<String>,
    /// Pre-computed argon2 PHC string.
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Plain password, hashed at load time. Ignored when `password_hash` is set.
    #[serde(default)]
    pub password: Option<String>,
}

/// The caller of a request, resolved from its session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorIdentity {
    pub id: OperatorId,
    pub name: String,
    pub counter_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at_ms: i64,
    pub operator: Operator,
}
