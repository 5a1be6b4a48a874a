//! Signed, stateless session tokens.
//!
//! A token is `authenticated:<issued-at>.<hex hmac-sha256>`. Anything that
//! fails to parse or verify is treated as an unauthenticated visitor.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "chatgate_session";
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const PAYLOAD_PREFIX: &str = "authenticated:";
const CLOCK_SKEW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
    max_age: Duration,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            max_age: SESSION_MAX_AGE,
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    pub fn issue(&self) -> String {
        self.issue_at(unix_now())
    }

    pub fn issue_at(&self, issued_at: u64) -> String {
        let payload = format!("{PAYLOAD_PREFIX}{issued_at}");
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("{payload}.{sig}")
    }

    pub fn verify(&self, token: &str) -> SessionState {
        self.verify_at(token, unix_now())
    }

    pub fn verify_at(&self, token: &str, now: u64) -> SessionState {
        let Some((payload, sig)) = token.rsplit_once('.') else {
            return SessionState::Unauthenticated;
        };
        let Ok(sig) = hex::decode(sig) else {
            return SessionState::Unauthenticated;
        };
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        if mac.verify_slice(&sig).is_err() {
            return SessionState::Unauthenticated;
        }

        let issued_at = payload
            .strip_prefix(PAYLOAD_PREFIX)
            .and_then(|s| s.parse::<u64>().ok());
        match issued_at {
            Some(iat)
                if iat <= now + CLOCK_SKEW_SECS
                    && now.saturating_sub(iat) <= self.max_age.as_secs() =>
            {
                SessionState::Authenticated
            }
            _ => SessionState::Unauthenticated,
        }
    }

    /// Session state carried by the request's cookie header.
    pub fn session_state(&self, headers: &HeaderMap) -> SessionState {
        match cookie_value(headers, SESSION_COOKIE) {
            Some(token) => self.verify(token),
            None => SessionState::Unauthenticated,
        }
    }
}

/// Find cookie `name` across every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

fn behind_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("https"))
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn login_cookie(token: &str, request_headers: &HeaderMap) -> (axum::http::HeaderName, HeaderValue) {
    let secure = if behind_https(request_headers) { "; Secure" } else { "" };
    let value = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        SESSION_MAX_AGE.as_secs()
    );
    (
        SET_COOKIE,
        HeaderValue::from_str(&value).expect("session cookie is visible ASCII"),
    )
}

pub fn logout_cookie() -> (axum::http::HeaderName, HeaderValue) {
    (
        SET_COOKIE,
        HeaderValue::from_static("chatgate_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "00112233445566778899aabbccddeeff";

    #[test]
    fn issued_token_verifies() {
        let signer = SessionSigner::new(SECRET);
        let token = signer.issue();
        assert_eq!(signer.verify(&token), SessionState::Authenticated);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = SessionSigner::new(SECRET);
        let token = signer.issue_at(1_000);
        let forged = token.replacen("1000", "9999", 1);
        assert_eq!(signer.verify_at(&forged, 1_000), SessionState::Unauthenticated);
        assert_eq!(signer.verify_at("garbage", 1_000), SessionState::Unauthenticated);
        assert_eq!(signer.verify_at("a.zz", 1_000), SessionState::Unauthenticated);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = SessionSigner::new(SECRET).issue_at(1_000);
        let other = SessionSigner::new("ffeeddccbbaa99887766554433221100");
        assert_eq!(other.verify_at(&token, 1_000), SessionState::Unauthenticated);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = SessionSigner::new(SECRET);
        let token = signer.issue_at(1_000);
        let later = 1_000 + SESSION_MAX_AGE.as_secs();
        assert_eq!(signer.verify_at(&token, later), SessionState::Authenticated);
        assert_eq!(signer.verify_at(&token, later + 1), SessionState::Unauthenticated);
    }

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("a=1; chatgate_session=tok.en; b=2"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("tok.en"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn secure_flag_follows_forwarded_proto() {
        let mut headers = HeaderMap::new();
        let (_, plain) = login_cookie("t", &headers);
        assert!(!plain.to_str().unwrap().contains("Secure"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let (_, secure) = login_cookie("t", &headers);
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }
}
