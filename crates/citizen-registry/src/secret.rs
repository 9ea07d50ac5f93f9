//! Account secret hashing using Argon2id.
//!
//! Citizens, agencies and the administrator authenticate with a secret whose
//! digest is stored as `argon2id$<salt-b64>$<hash-b64>`. The citizen's digest
//! lives in the profile's account sub-group, so it is versioned with the rest
//! of the payload.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{RegistryError, Result};

const SCHEME: &str = "argon2id";

/// Argon2id parameters for secret hashing.
const ARGON2_M_COST: u32 = 19_456; // 19 MiB
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

fn derive(secret: &[u8], salt: &[u8; 16]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| RegistryError::DerivationFailed(format!("Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(secret, salt, &mut output)
        .map_err(|e| RegistryError::DerivationFailed(format!("Argon2 hash: {e}")))?;

    Ok(output)
}

/// Hash a secret with a fresh random salt.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` for an empty secret, or
/// `RegistryError::DerivationFailed` if Argon2 fails.
pub fn hash_secret(secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(RegistryError::InvalidInput("secret must not be empty".into()));
    }

    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = derive(secret.as_bytes(), &salt)?;
    let encoded = format!(
        "{SCHEME}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(hash)
    );
    hash.zeroize();
    Ok(encoded)
}

/// Check a secret against a stored digest.
///
/// An empty or malformed stored digest never verifies.
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(salt_b64), Some(hash_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(salt): std::result::Result<[u8; 16], _> = salt.try_into() else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(hash_b64) else {
        return false;
    };

    let Ok(mut actual) = derive(secret.as_bytes(), &salt) else {
        return false;
    };
    let matches = constant_time_eq(&actual, &expected);
    actual.zeroize();
    matches
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
