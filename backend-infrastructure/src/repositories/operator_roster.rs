use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::fs;
use tracing::{info, warn};

use crate::config::validate_username;
use crate::repositories::MemoryStore;
use backend_domain::{normalize_optional_text, CredentialService, OperatorRepository, OperatorSeed};

const BOOTSTRAP_USERNAME: &str = "admin";

pub async fn load_operator_seeds(path: &str) -> Result<Vec<OperatorSeed>> {
    if path.trim().is_empty() || !Path::new(path).exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read operator roster {}", path))?;
    let seeds: Vec<OperatorSeed> =
        serde_yaml::from_str(&content).with_context(|| format!("invalid operator roster {}", path))?;
    Ok(seeds)
}

/// Upserts every roster entry. Plain-text passwords are hashed on the way in.
/// When the store ends up without any operator, a bootstrap `admin` with a
/// random password is created and the password is logged once.
pub async fn seed_operators(
    store: &MemoryStore,
    credentials: &dyn CredentialService,
    seeds: Vec<OperatorSeed>,
) -> Result<usize> {
    let mut seeded = 0;
    for seed in seeds {
        let username = seed.username.trim().to_lowercase();
        validate_username(&username)?;
        let password_hash = match (
            normalize_optional_text(seed.password_hash),
            normalize_optional_text(seed.password),
        ) {
            (Some(hash), _) => hash,
            (None, Some(password)) => credentials.hash_password(&password)?,
            (None, None) => {
                return Err(anyhow!(
                    "operator '{}' needs password_hash or password",
                    username
                ))
            }
        };
        let display_name = normalize_optional_text(seed.display_name).unwrap_or_else(|| username.clone());
        let counter_name = normalize_optional_text(seed.counter_name);
        let operator = store
            .upsert_operator(&username, &display_name, counter_name, password_hash)
            .await?;
        info!(operator = %operator.id, username = %operator.username, "operator seeded");
        seeded += 1;
    }

    if store.list_operators().await?.is_empty() {
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let hash = credentials.hash_password(&password)?;
        store
            .upsert_operator(BOOTSTRAP_USERNAME, "Administrator", None, hash)
            .await?;
        warn!(
            username = BOOTSTRAP_USERNAME,
            password = %password,
            "no operators configured, created bootstrap operator; change it via the roster"
        );
        seeded += 1;
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Argon2CredentialService;

    #[tokio::test]
    async fn roster_yaml_seeds_hashed_operators() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("operators.yaml");
        std::fs::write(
            &path,
            "- username: Desk1\n  display_name: Desk One\n  counter_name: A\n  password: hunter22\n",
        )
        .expect("write roster");

        let store = MemoryStore::in_memory();
        let credentials = Argon2CredentialService;
        let seeds = load_operator_seeds(path.to_str().expect("utf8 path"))
            .await
            .expect("load");
        let count = seed_operators(&store, &credentials, seeds).await.expect("seed");
        assert_eq!(count, 1);

        let account = store
            .find_account("desk1")
            .await
            .expect("find")
            .expect("seeded account");
        assert_eq!(account.operator.display_name, "Desk One");
        assert_eq!(account.operator.counter_name.as_deref(), Some("A"));
        assert!(credentials.verify_password(&account.password_hash, "hunter22"));
    }

    #[tokio::test]
    async fn empty_roster_creates_bootstrap_admin() {
        let store = MemoryStore::in_memory();
        let count = seed_operators(&store, &Argon2CredentialService, Vec::new())
            .await
            .expect("seed");
        assert_eq!(count, 1);
        assert!(store.find_account("admin").await.expect("find").is_some());
    }
}
