use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL_SAFE;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug)]
pub enum Error {
    InvalidToken,
}

type Result<T> = std::result::Result<T, Error>;

/// Claims embedded in a bearer token. Validity is purely cryptographic plus
/// the expiry check; nothing is persisted server-side.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

fn sign(secret: &str, message: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Issues a signed token embedding the user id and an absolute expiry.
pub fn issue(secret: &str, user_id: String) -> String {
    issue_with_lifetime(secret, user_id, Duration::hours(TOKEN_LIFETIME_HOURS))
}

pub fn issue_with_lifetime(secret: &str, user_id: String, lifetime: Duration) -> String {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + lifetime).timestamp(),
    };
    let encoded_claims =
        BASE64_URL_SAFE.encode(serde_json::to_vec(&claims).expect("Claims are serializable"));
    let signature = BASE64_URL_SAFE.encode(sign(secret, encoded_claims.as_bytes()));

    format!("{}.{}", encoded_claims, signature)
}

/// Verifies signature and expiry. Malformed, forged and expired tokens all
/// collapse into the same `InvalidToken` so callers cannot tell them apart.
pub fn verify(secret: &str, token: &str) -> Result<Claims> {
    let (encoded_claims, encoded_signature) =
        token.split_once('.').ok_or(Error::InvalidToken)?;

    let signature = BASE64_URL_SAFE
        .decode(encoded_signature)
        .map_err(|_| Error::InvalidToken)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(encoded_claims.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| Error::InvalidToken)?;

    let claims_bytes = BASE64_URL_SAFE
        .decode(encoded_claims)
        .map_err(|_| Error::InvalidToken)?;
    let claims =
        serde_json::from_slice::<Claims>(&claims_bytes).map_err(|_| Error::InvalidToken)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(Error::InvalidToken);
    }

    Ok(claims)
}
