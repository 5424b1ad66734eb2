//! Identifier generation and validation.
//!
//! Identifiers are opaque strings over `[a-zA-Z0-9_-]`. Generated ones are 20 to 30
//! alphanumeric characters. Uniqueness is checked optimistically against storage at
//! call time; a collision is retried rather than waited on.

use crate::error::{PasteError, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const MIN_GENERATED_LEN: usize = 20;
pub const MAX_GENERATED_LEN: usize = 30;
pub const MAX_ATTEMPTS: usize = 10;

pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn validate_identifier(id: &str) -> Result<()> {
    if is_valid_identifier(id) {
        Ok(())
    } else {
        Err(PasteError::InvalidIdentifier(id.to_string()))
    }
}

/// A random candidate, not checked against storage.
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(MIN_GENERATED_LEN..=MAX_GENERATED_LEN);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Draws candidates until `in_use` reports a free one.
pub fn generate_identifier<F>(mut in_use: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let mut rng = rand::thread_rng();
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = random_identifier(&mut rng);
        if !in_use(&candidate)? {
            return Ok(candidate);
        }
        tracing::debug!(attempt, "identifier collision, retrying");
    }
    Err(PasteError::IdentifierExhausted(MAX_ATTEMPTS))
}
