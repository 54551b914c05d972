use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 50_000;
const SALT_LEN: usize = 16;

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// PBKDF2 with HMAC-SHA256, single block (the derived key is exactly one
/// SHA-256 output wide).
fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut block = salt.to_vec();
    block.extend_from_slice(&1u32.to_be_bytes());

    let mut u = hmac_sha256(password, &block);
    let mut derived = u;
    for _ in 1..iterations {
        u = hmac_sha256(password, &u);
        for (d, b) in derived.iter_mut().zip(u.iter()) {
            *d ^= b;
        }
    }

    derived
}

/// Hashes a password with a fresh random salt. The stored form is
/// `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`; the plaintext is never
/// persisted.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let derived = derive(password.as_bytes(), &salt, ITERATIONS);

    format!(
        "{}${}${}${}",
        ALGORITHM,
        ITERATIONS,
        hex::encode(salt),
        hex::encode(derived)
    )
}

/// Checks a password against a stored hash. Any parse failure counts as a
/// mismatch.
pub fn verify(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    let derived = derive(password.as_bytes(), &salt, iterations);

    // Fixed-width comparison over the HMAC output, not the attacker-supplied
    // string.
    expected.len() == derived.len()
        && expected
            .iter()
            .zip(derived.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
