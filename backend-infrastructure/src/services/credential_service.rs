use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use backend_domain::CredentialService;

/// Argon2id password hashing with the crate defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2CredentialService;

impl CredentialService for Argon2CredentialService {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("password hashing failed: {err}"))
    }

    fn verify_password(&self, password_hash: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let service = Argon2CredentialService;
        let hash = service.hash_password("s3cret!").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(service.verify_password(&hash, "s3cret!"));
        assert!(!service.verify_password(&hash, "s3cret"));
        assert!(!service.verify_password("not-a-hash", "s3cret!"));
    }
}
