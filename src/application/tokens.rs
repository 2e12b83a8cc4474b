//! Share/burn token allocation.
//!
//! Tokens are 8 random bytes hex-encoded (64 bits of randomness), re-rolled
//! when the durable store already holds the candidate. The check-then-use is
//! not atomic with the eventual insert; the insert-time uniqueness constraint
//! is the backstop for that narrow window.

use std::future::Future;

use rand::RngCore;

use super::error::AppError;
use super::repos::RepoError;

const MAX_ATTEMPTS: usize = 8;

fn random_token() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Produce a token the durable store does not already hold.
///
/// `exists` checks the durable store (not the cache), since the store is
/// authoritative for token uniqueness.
pub async fn allocate_token<F, Fut>(mut exists: F) -> Result<String, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, RepoError>>,
{
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_token();
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::IdentifierCollision)
}
