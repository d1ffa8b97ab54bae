//! Cookie-backed session store.
//!
//! The token is read from the session cookie, or from an
//! `Authorization: Bearer` header for non-browser clients. A cookie that
//! fails verification does not shadow a valid bearer token. Reading never
//! fails: anything other than a valid, unexpired token is "no session".

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Duration, Utc};

use agencyhub_auth::{Session, SessionError, SessionSigner};

#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    signer: SessionSigner,
    cookie_name: String,
    secure: bool,
}

impl CookieSessionStore {
    pub fn new(signer: SessionSigner, cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            signer,
            cookie_name: cookie_name.into(),
            secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.signer.ttl()
    }

    /// Session carried by `headers`, if any.
    pub fn get_session(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<Session> {
        [self.token_from_cookie(headers), bearer_token(headers)]
            .into_iter()
            .flatten()
            .find_map(|token| match self.signer.verify(token, now) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring invalid session token");
                    None
                }
            })
    }

    /// Sign `session` and build the `Set-Cookie` value carrying it.
    pub fn set_session(&self, session: &Session, now: DateTime<Utc>) -> Result<(String, HeaderValue), SessionError> {
        let token = self.signer.sign(session, now)?;
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name,
            token,
            self.signer.ttl().num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }

        let value = HeaderValue::from_str(&cookie).map_err(|e| SessionError::Encode(e.to_string()))?;
        Ok((token, value))
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_session(&self) -> HeaderValue {
        let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.cookie_name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("Max-Age=0"))
    }

    fn token_from_cookie<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.cookie_name && !value.is_empty())
            .map(|(_, value)| value)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use agencyhub_auth::Role;
    use agencyhub_core::{AgencyId, UserId};

    use super::*;

    fn store(secure: bool) -> CookieSessionStore {
        CookieSessionStore::new(SessionSigner::new(b"cookie-test-secret", Duration::hours(1)), "sid", secure)
    }

    fn staff() -> Session {
        Session::new(UserId::new(), "staff@example.com", Role::Staff, Some(AgencyId::new())).unwrap()
    }

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(name, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn set_then_get_via_cookie() {
        let now = Utc::now();
        let s = staff();
        let (token, set_cookie) = store(false).set_session(&s, now).unwrap();

        let set_cookie = set_cookie.to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("sid={token};")));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=3600"));
        assert!(!set_cookie.contains("Secure"));

        let h = headers(header::COOKIE, &format!("theme=dark; sid={token}; lang=fr"));
        assert_eq!(store(false).get_session(&h, now), Some(s));
    }

    #[test]
    fn bearer_header_is_accepted() {
        let now = Utc::now();
        let s = staff();
        let (token, _) = store(false).set_session(&s, now).unwrap();
        let h = headers(header::AUTHORIZATION, &format!("Bearer {token}"));
        assert_eq!(store(false).get_session(&h, now), Some(s));
    }

    #[test]
    fn missing_malformed_and_expired_are_none() {
        let now = Utc::now();
        let st = store(false);
        assert_eq!(st.get_session(&HeaderMap::new(), now), None);
        assert_eq!(st.get_session(&headers(header::COOKIE, "sid=garbage"), now), None);
        assert_eq!(st.get_session(&headers(header::COOKIE, "sid="), now), None);

        let (token, _) = st.set_session(&staff(), now).unwrap();
        let h = headers(header::COOKIE, &format!("sid={token}"));
        assert_eq!(st.get_session(&h, now + Duration::hours(2)), None);
    }

    #[test]
    fn stale_cookie_falls_back_to_bearer() {
        let now = Utc::now();
        let st = store(false);
        let s = staff();
        let (token, _) = st.set_session(&s, now).unwrap();

        let mut h = headers(header::COOKIE, "sid=left-over-from-old-login");
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        assert_eq!(st.get_session(&h, now), Some(s.clone()));

        // A valid cookie still wins over a bearer token.
        let other = staff();
        let (cookie_token, _) = st.set_session(&other, now).unwrap();
        h.insert(header::COOKIE, HeaderValue::from_str(&format!("sid={cookie_token}")).unwrap());
        assert_eq!(st.get_session(&h, now), Some(other));
    }

    #[test]
    fn other_cookie_names_are_ignored() {
        let now = Utc::now();
        let (token, _) = store(false).set_session(&staff(), now).unwrap();
        let h = headers(header::COOKIE, &format!("not_sid={token}"));
        assert_eq!(store(false).get_session(&h, now), None);
    }

    #[test]
    fn clear_expires_the_cookie() {
        let cleared = store(true).clear_session();
        let cleared = cleared.to_str().unwrap();
        assert!(cleared.starts_with("sid=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.ends_with("; Secure"));
    }
}
