//! Password hashing.

use anyhow::{anyhow, Result};

/// Hash a password with bcrypt on the blocking thread pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    // ---
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| anyhow!("Password hashing task failed: {}", e))?
        .map_err(|e| anyhow!("Failed to hash password: {}", e))
}
