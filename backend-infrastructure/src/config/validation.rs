use anyhow::{anyhow, Result};

pub fn validate_username(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("operator username is empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(anyhow!("operator username '{}' must not contain spaces", value));
    }
    Ok(())
}

pub fn validate_log_format(value: &str) -> Result<()> {
    match value {
        "text" | "json" => Ok(()),
        other => Err(anyhow!("log_format must be 'text' or 'json', got '{}'", other)),
    }
}
