//! Session token signing (HS256).
//!
//! Tokens are opaque to callers: they go out in a cookie and come back in
//! the next request. Verification checks the signature first, then the
//! claims' time window, then the role/agency pairing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::session::{Session, SessionBindingError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to encode token: {0}")]
    Encode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error(transparent)]
    Binding(#[from] SessionBindingError),
}

/// Signs and verifies session tokens with a shared secret and a fixed TTL.
#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `session`, valid from `now` for the configured TTL.
    pub fn sign(&self, session: &Session, now: DateTime<Utc>) -> Result<String, SessionError> {
        session.check_binding()?;

        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| SessionError::Encode("session expiry is out of range".into()))?;
        let claims = SessionClaims {
            session: session.clone(),
            issued_at: now,
            expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }

    /// Verify `token` and return the session it carries.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        // Expiry lives in our own claims; validate_claims checks it against `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => SessionError::InvalidSignature,
                _ => SessionError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        data.claims.session.check_binding()?;

        Ok(data.claims.session)
    }
}

impl core::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use agencyhub_core::{AgencyId, UserId};
    use serde_json::json;

    use super::*;
    use crate::Role;

    fn signer() -> SessionSigner {
        SessionSigner::new(b"unit-test-secret", Duration::hours(2))
    }

    fn admin() -> Session {
        Session::new(UserId::new(), "admin@example.com", Role::Admin, Some(AgencyId::new())).unwrap()
    }

    #[test]
    fn sign_then_verify_returns_same_session() {
        let now = Utc::now();
        let s = admin();
        let token = signer().sign(&s, now).unwrap();
        assert_eq!(signer().verify(&token, now).unwrap(), s);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = signer().sign(&admin(), now).unwrap();
        let later = now + Duration::hours(2);
        assert_eq!(
            signer().verify(&token, later),
            Err(SessionError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn ttl_past_the_calendar_is_an_error() {
        let huge = SessionSigner::new(b"unit-test-secret", Duration::milliseconds(i64::MAX));
        assert!(matches!(huge.sign(&admin(), Utc::now()), Err(SessionError::Encode(_))));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let now = Utc::now();
        let other = SessionSigner::new(b"some-other-secret", Duration::hours(2));
        let token = other.sign(&admin(), now).unwrap();
        assert_eq!(signer().verify(&token, now), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let res = signer().verify("not.a.token", Utc::now());
        assert!(matches!(res, Err(SessionError::Malformed(_))));
    }

    #[test]
    fn refuses_to_sign_unbound_staff_session() {
        let s = Session {
            user_id: UserId::new(),
            email: "staff@example.com".to_string(),
            role: Role::Staff,
            agency_id: None,
        };
        assert!(matches!(signer().sign(&s, Utc::now()), Err(SessionError::Binding(_))));
    }

    #[test]
    fn verify_rejects_signed_but_unbound_payload() {
        // Hand-built token: correct signature, tenant-bound role, no agency.
        let now = Utc::now();
        let claims = json!({
            "user_id": UserId::new(),
            "email": "staff@example.com",
            "role": "staff",
            "issued_at": now,
            "expires_at": now + Duration::hours(1),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert!(matches!(signer().verify(&token, now), Err(SessionError::Binding(_))));
    }

    #[test]
    fn unknown_role_in_token_is_malformed() {
        let now = Utc::now();
        let claims = json!({
            "user_id": UserId::new(),
            "email": "x@example.com",
            "role": "owner",
            "agency_id": AgencyId::new(),
            "issued_at": now,
            "expires_at": now + Duration::hours(1),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert!(matches!(signer().verify(&token, now), Err(SessionError::Malformed(_))));
    }
}
