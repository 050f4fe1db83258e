//! Bearer token inspection.
//!
//! The backend issues HS256 JWTs with an `exp` claim. The client cannot
//! verify the signature and does not try to; it only reads the expiry so a
//! stale session is dropped instead of being presented to the server.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};

/// Expiry encoded in the token's `exp` claim, if it is a decodable JWT.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;

    DateTime::from_timestamp(secs, 0)
}

/// Whether the token is known to be expired at `now`.
/// Opaque tokens without a readable expiry are never considered expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).is_some_and(|exp| exp <= now)
}

#[cfg(test)]
pub(crate) fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": "1", "username": "alice", "role": "user", "exp": exp })
            .to_string(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
