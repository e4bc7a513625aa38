use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash password for secure storage using the configured bcrypt work factor.
/// Runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    let cost = config::config().security.bcrypt_work_factor;
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Verify password against stored hash
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// Burn one verification for a login with no stored hash. Always false.
pub async fn verify_against_dummy(password: String) -> Result<bool, PasswordError> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_password("jobly-no-such-user".to_string()))
        .await?;
    verify_password(password, hash.clone()).await?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_what_it_hashes() {
        let hashed = hash_password("hunter22".to_string()).await.unwrap();
        assert_ne!(hashed, "hunter22");
        assert!(verify_password("hunter22".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("hunter23".to_string(), hashed).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_verification_never_matches() {
        assert!(!verify_against_dummy("hunter22".to_string()).await.unwrap());
        assert!(!verify_against_dummy("jobly-no-such-user".to_string()).await.unwrap());

        let cost = config::config().security.bcrypt_work_factor;
        let hash = DUMMY_HASH.get().unwrap();
        assert!(hash.contains(&format!("${:02}$", cost)));
    }
}
