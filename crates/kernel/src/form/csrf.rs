//! Anti-forgery token generation and comparison.

use anyhow::{Context, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

/// Session key holding the token.
const CSRF_SESSION_KEY: &str = "form_token";

/// Generate a fresh token: random bytes and the current time, hashed.
pub fn generate_token() -> String {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let timestamp = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(timestamp.to_le_bytes());
    hex::encode(hasher.finalize())
}

/// The session's token, created and stored on first use.
///
/// One token serves every form in the session, so re-rendering a form
/// after a failed submission keeps it valid.
pub async fn session_token(session: &Session) -> Result<String> {
    let existing: Option<String> = session
        .get(CSRF_SESSION_KEY)
        .await
        .context("failed to read form token from session")?;

    if let Some(token) = existing {
        return Ok(token);
    }

    let token = generate_token();
    session
        .insert(CSRF_SESSION_KEY, &token)
        .await
        .context("failed to store form token in session")?;
    Ok(token)
}

/// Compare a submitted token with the expected one in constant time.
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    if expected.is_empty() || submitted.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}
