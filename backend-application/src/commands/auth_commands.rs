use anyhow::anyhow;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    LoginRequest,
    LoginResponse,
    Operator,
    OperatorAccount,
    OperatorId,
    OperatorIdentity,
    OperatorInput,
};

const TOKEN_PREFIX: &str = "checkin";
const TOKEN_VERSION: &str = "v1";
const MIN_PASSWORD_LEN: usize = 6;

type HmacSha256 = Hmac<Sha256>;

pub async fn login(state: &AppState, payload: LoginRequest) -> Result<LoginResponse, AppError> {
    let username = payload.username.trim().to_lowercase();
    let account = state.operator_repo.find_account(&username).await?;
    let Some(account) = account else {
        warn!(username = %username, "login rejected: unknown operator");
        return Err(AppError::Unauthorized("invalid username or password".to_string()));
    };
    if !state
        .credentials
        .verify_password(&account.password_hash, &payload.password)
    {
        warn!(operator = %account.operator.id, "login rejected: bad password");
        return Err(AppError::Unauthorized("invalid username or password".to_string()));
    }

    let expires_at_ms = (Utc::now() + Duration::minutes(state.config.session_ttl_minutes as i64))
        .timestamp_millis();
    let token = issue_token(&state.config.session_secret, account.operator.id, expires_at_ms)?;
    info!(operator = %account.operator.id, username = %account.operator.username, "operator logged in");

    Ok(LoginResponse {
        token,
        expires_at_ms,
        operator: account.operator,
    })
}

/// Resolves a bearer token to the operator it was issued for. The operator
/// must still exist; expired or tampered tokens are rejected.
pub async fn authenticate(state: &AppState, token: &str) -> Result<OperatorIdentity, AppError> {
    let operator_id = verify_token(
        &state.config.session_secret,
        token,
        Utc::now().timestamp_millis(),
    )?;
    let account = state
        .operator_repo
        .get_account(operator_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("operator no longer exists".to_string()))?;
    Ok(identity_of(&account))
}

pub async fn create_operator(state: &AppState, payload: OperatorInput) -> Result<Operator, AppError> {
    let username = normalize_optional_text(Some(payload.username))
        .map(|value| value.to_lowercase())
        .ok_or_else(|| AppError::BadRequest("username must not be empty".to_string()))?;
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest("username must not contain spaces".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let display_name = normalize_optional_text(payload.display_name).unwrap_or_else(|| username.clone());
    let counter_name = normalize_optional_text(payload.counter_name);

    let password_hash = state.credentials.hash_password(&payload.password)?;
    let operator = state
        .operator_repo
        .create_operator(&username, &display_name, counter_name, password_hash)
        .await?;
    info!(operator = %operator.id, username = %operator.username, "operator created");
    Ok(operator)
}

pub fn identity_of(account: &OperatorAccount) -> OperatorIdentity {
    OperatorIdentity {
        id: account.operator.id,
        name: account.operator.display_name.clone(),
        counter_name: account.operator.counter_name.clone(),
    }
}

pub fn issue_token(secret: &str, operator_id: OperatorId, expires_at_ms: i64) -> Result<String, AppError> {
    let signature = sign_hmac_sha256(secret, &signing_payload(operator_id, expires_at_ms))?;
    Ok(format!(
        "{}.{}.{}.{}.{}",
        TOKEN_PREFIX, TOKEN_VERSION, operator_id, expires_at_ms, signature
    ))
}

pub fn verify_token(secret: &str, token: &str, now_ms: i64) -> Result<OperatorId, AppError> {
    let invalid = || AppError::Unauthorized("invalid session token".to_string());

    let parts: Vec<&str> = token.trim().split('.').collect();
    let [prefix, version, operator, expires, signature] = parts.as_slice() else {
        return Err(invalid());
    };
    if *prefix != TOKEN_PREFIX || *version != TOKEN_VERSION {
        return Err(invalid());
    }
    let operator_id = OperatorId(operator.parse::<i64>().map_err(|_| invalid())?);
    let expires_at_ms = expires.parse::<i64>().map_err(|_| invalid())?;
    let signature = decode_hex(signature).ok_or_else(invalid)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow!("hmac init failed: {err}")))?;
    mac.update(signing_payload(operator_id, expires_at_ms).as_bytes());
    mac.verify_slice(&signature).map_err(|_| invalid())?;

    if expires_at_ms <= now_ms {
        return Err(AppError::Unauthorized("session expired".to_string()));
    }
    Ok(operator_id)
}

fn signing_payload(operator_id: OperatorId, expires_at_ms: i64) -> String {
    format!("{}|{}|{}|{}", TOKEN_PREFIX, TOKEN_VERSION, operator_id, expires_at_ms)
}

fn sign_hmac_sha256(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow!("hmac init failed: {err}")))?;
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 || !value.is_ascii() {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|idx| u8::from_str_radix(&value[idx..idx + 2], 16).ok())
        .collect()
}
