// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bearer token issuance and validation
//!
//! Tokens are HS256 JWTs. Signing alone is not enough for a token to be
//! accepted: it must also have a live entry in the [`LedgerStore`]. The
//! ledger is consulted first, then the expiry recorded there, then the
//! signature.
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, TimeZone, Utc};
//! use newsroom::auth::{AuthError, ManualClock, TokenLedger, TokenService};
//! use newsroom::store::User;
//!
//! let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()));
//! let service = TokenService::new(b"secret", Arc::new(TokenLedger::new()), clock.clone());
//! let user = User::with_hash("editor", "$6$x$y".to_string(), false);
//!
//! let token = service.issue(&user).unwrap();
//! let identity = service.validate(Some(format!("Bearer {token}").as_str())).unwrap();
//! assert_eq!(identity.user_id, user.id);
//!
//! clock.advance(Duration::hours(2));
//! assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::TokenExpired));
//! ```

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, FixedOffset, Offset, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};

use super::claims::{Identity, TokenClaims};
use super::clock::Clock;
use super::error::AuthError;
use super::ledger::{LedgerEntry, LedgerStore};
use crate::config::{AuthConfig, MAX_TOKEN_LIFETIME_SECS};
use crate::store::User;

/// Remove an optional `Bearer ` prefix
///
/// The match is case-sensitive. A value without the prefix is returned
/// unchanged and treated as the raw token.
pub fn strip_bearer(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

/// Issues, validates and revokes bearer tokens
pub struct TokenService {
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    signing_key: EncodingKey,
    verification_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: Duration,
    zone: FixedOffset,
    issuer: String,
}

impl TokenService {
    /// Create a service signing with `secret`
    ///
    /// Tokens live one hour and expiries are compared in UTC until changed
    /// with [`valid_for`](Self::valid_for) and
    /// [`with_reference_zone`](Self::with_reference_zone).
    pub fn new(secret: &[u8], ledger: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        TokenService {
            ledger,
            clock,
            signing_key: EncodingKey::from_secret(secret),
            verification_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetime: Duration::hours(1),
            zone: Utc.fix(),
            issuer: "newsroom".to_string(),
        }
    }

    /// Create a service from the `auth` section of the configuration
    pub fn from_config(
        config: &AuthConfig,
        ledger: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&config.token_lifetime_secs) {
            anyhow::bail!(
                "Invalid token lifetime: {} seconds",
                config.token_lifetime_secs
            );
        }
        let zone = config.reference_zone().with_context(|| {
            format!(
                "Invalid reference UTC offset: {} minutes",
                config.reference_utc_offset_minutes
            )
        })?;
        Ok(Self::new(config.hmac_secret.as_bytes(), ledger, clock)
            .valid_for(config.token_lifetime())
            .with_reference_zone(zone)
            .with_issuer(config.issuer.clone()))
    }

    /// Set the lifetime of issued tokens
    pub fn valid_for(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Set the zone naive ledger expiries are read in
    pub fn with_reference_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    /// Sets the issuer name used in token claims
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn token_lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `user` and record it in the ledger
    ///
    /// The ledger entry is written before the token is returned, so the
    /// token is immediately usable. Users may hold any number of tokens.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = self.clock.now();
        let expiry = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Issuance {
                reason: format!("expiry overflows after adding {}", self.lifetime),
            })?;

        let claims = TokenClaims {
            sub: user.id.clone(),
            admin: user.is_admin,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            iss: self.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.signing_key).map_err(
            |e| AuthError::Issuance {
                reason: e.to_string(),
            },
        )?;

        self.ledger.insert(LedgerEntry {
            user_id: user.id.clone(),
            token: token.clone(),
            expiry: expiry.with_timezone(&self.zone).into(),
        })?;

        debug!("Issued token for user {} valid until {}", user.handle, expiry);
        Ok(token)
    }

    /// Validate the value of an `Authorization` header
    ///
    /// An expired token has its ledger entry deleted as a side effect, so
    /// presenting it a second time fails with [`AuthError::TokenNotFound`].
    pub fn validate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = match header.map(str::trim) {
            Some(value) if !value.is_empty() => strip_bearer(value),
            _ => return Err(AuthError::MissingCredential),
        };

        let entry = self
            .ledger
            .find_by_token(token)?
            .ok_or(AuthError::TokenNotFound)?;

        let expiry = entry.expiry.normalize(&self.zone);
        let now = self.clock.now().with_timezone(&self.zone);
        if now >= expiry {
            debug!("Token of user {} expired at {}", entry.user_id, expiry);
            if let Err(e) = self.ledger.delete(&entry) {
                warn!("Failed to evict expired token of user {}: {}", entry.user_id, e);
            }
            return Err(AuthError::TokenExpired);
        }

        let mut validation = Validation::new(self.algorithm);
        // Expiry is enforced by the ledger against the injected clock
        validation.validate_exp = false;
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<TokenClaims>(token, &self.verification_key, &validation).map_err(
            |e| {
                debug!("Rejected ledger token of user {}: {}", entry.user_id, e);
                AuthError::InvalidToken
            },
        )?;

        Identity::try_from(data.claims).map_err(|_| AuthError::InvalidToken)
    }

    /// Delete the ledger entry of a presented token
    pub fn revoke(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = match header.map(str::trim) {
            Some(value) if !value.is_empty() => strip_bearer(value),
            _ => return Err(AuthError::MissingCredential),
        };
        if let Some(entry) = self.ledger.find_by_token(token)? {
            self.ledger.delete(&entry)?;
            debug!("Revoked token of user {}", entry.user_id);
        }
        Ok(())
    }

    /// Delete every ledger entry of a user
    pub fn revoke_user(&self, user_id: &str) -> Result<usize, AuthError> {
        let removed = self.ledger.delete_for_user(user_id)?;
        if removed > 0 {
            debug!("Revoked {} token(s) of user {}", removed, user_id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::ledger::{MockLedgerStore, StoredExpiry, TokenLedger};
    use crate::store::StoreError;
    use chrono::{DateTime, NaiveDate, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn setup() -> (TokenService, Arc<TokenLedger>, Arc<ManualClock>) {
        let ledger = Arc::new(TokenLedger::new());
        let clock = Arc::new(ManualClock::new(start()));
        let service = TokenService::new(b"test-secret", ledger.clone(), clock.clone());
        (service, ledger, clock)
    }

    fn user(handle: &str, is_admin: bool) -> User {
        User::with_hash(handle, "$6$salt$hash".to_string(), is_admin)
    }

    #[test]
    fn test_issue_then_validate() {
        let (service, ledger, _) = setup();
        let admin = user("admin", true);
        let reader = user("reader", false);

        let admin_token = service.issue(&admin).unwrap();
        let reader_token = service.issue(&reader).unwrap();
        assert_eq!(ledger.len(), 2);

        let identity = service.validate(Some(admin_token.as_str())).unwrap();
        assert_eq!(identity.user_id, admin.id);
        assert!(identity.is_admin);
        assert_eq!(identity.expiry, start() + Duration::hours(1));

        let identity = service.validate(Some(reader_token.as_str())).unwrap();
        assert_eq!(identity.user_id, reader.id);
        assert!(!identity.is_admin);
    }

    #[test]
    fn test_tokens_are_distinct() {
        let (service, ledger, _) = setup();
        let reader = user("reader", false);

        let first = service.issue(&reader).unwrap();
        let second = service.issue(&reader).unwrap();
        assert_ne!(first, second);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        let (service, _, _) = setup();
        let token = service.issue(&user("reader", false)).unwrap();

        let bare = service.validate(Some(token.as_str())).unwrap();
        let prefixed = service.validate(Some(format!("Bearer {}", token).as_str())).unwrap();
        assert_eq!(bare, prefixed);

        // Prefix match is case-sensitive
        assert_eq!(
            service.validate(Some(format!("bearer {}", token).as_str())),
            Err(AuthError::TokenNotFound)
        );
    }

    #[test]
    fn test_missing_credential() {
        let (service, _, _) = setup();
        assert_eq!(service.validate(None), Err(AuthError::MissingCredential));
        assert_eq!(service.validate(Some("")), Err(AuthError::MissingCredential));
        assert_eq!(service.validate(Some("   ")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_expiry_then_eviction() {
        let (service, ledger, clock) = setup();
        let token = service.issue(&user("reader", false)).unwrap();

        clock.advance(Duration::minutes(59));
        assert!(service.validate(Some(token.as_str())).is_ok());

        clock.advance(Duration::minutes(2));
        assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::TokenExpired));
        assert!(ledger.is_empty());
        assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::TokenNotFound));
    }

    #[test]
    fn test_expiry_instant_is_exclusive() {
        let (service, _, clock) = setup();
        let token = service.issue(&user("reader", false)).unwrap();

        clock.set(start() + Duration::hours(1) - Duration::seconds(1));
        assert!(service.validate(Some(token.as_str())).is_ok());

        clock.set(start() + Duration::hours(1));
        assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_tampered_token_not_found() {
        let (service, _, _) = setup();
        let token = service.issue(&user("reader", false)).unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(service.validate(Some(tampered.as_str())), Err(AuthError::TokenNotFound));
        assert_eq!(service.validate(Some("garbage")), Err(AuthError::TokenNotFound));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let (service, ledger, clock) = setup();
        let foreign = TokenService::new(b"another-secret", ledger.clone(), clock.clone());

        let token = foreign.issue(&user("reader", false)).unwrap();
        assert!(ledger.find_by_token(&token).unwrap().is_some());
        assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_malformed_ledger_token_rejected() {
        let (service, ledger, _) = setup();
        ledger
            .insert(LedgerEntry {
                user_id: "u1".to_string(),
                token: "not-a-jwt".to_string(),
                expiry: StoredExpiry::Zoned((start() + Duration::hours(1)).fixed_offset()),
            })
            .unwrap();

        assert_eq!(service.validate(Some("not-a-jwt")), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_failed_eviction_still_expired() {
        let expired = LedgerEntry {
            user_id: "u1".to_string(),
            token: "stale".to_string(),
            expiry: StoredExpiry::Zoned((start() - Duration::minutes(1)).fixed_offset()),
        };

        let mut ledger = MockLedgerStore::new();
        let found = expired.clone();
        ledger
            .expect_find_by_token()
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));
        ledger
            .expect_delete()
            .times(1)
            .returning(|_| Err(StoreError::Poisoned("token ledger")));

        let clock = Arc::new(ManualClock::new(start()));
        let service = TokenService::new(b"test-secret", Arc::new(ledger), clock);

        assert_eq!(
            service.validate(Some("Bearer stale")),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_naive_expiry_read_in_reference_zone() {
        let (service, ledger, clock) = setup();
        let service = service.with_reference_zone(FixedOffset::east_opt(2 * 3600).unwrap());
        let token = service.issue(&user("reader", false)).unwrap();

        // 12:00 wall clock at UTC+2 is 10:00 UTC
        let naive = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ledger
            .insert(LedgerEntry {
                user_id: "u1".to_string(),
                token: token.clone(),
                expiry: StoredExpiry::Naive(naive),
            })
            .unwrap();

        clock.set(Utc.with_ymd_and_hms(2025, 3, 1, 9, 59, 0).unwrap());
        assert!(service.validate(Some(token.as_str())).is_ok());

        // Still before 12:00 if the naive value were read as UTC
        clock.set(Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap());
        assert_eq!(service.validate(Some(token.as_str())), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_ledger_failure_surfaces() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_find_by_token()
            .returning(|_| Err(StoreError::Poisoned("token ledger")));

        let clock = Arc::new(ManualClock::new(start()));
        let service = TokenService::new(b"test-secret", Arc::new(ledger), clock);

        assert!(matches!(
            service.validate(Some("token")),
            Err(AuthError::Store { .. })
        ));
    }

    #[test]
    fn test_revoke() {
        let (service, _, _) = setup();
        let reader = user("reader", false);
        let first = service.issue(&reader).unwrap();
        let second = service.issue(&reader).unwrap();
        let other = service.issue(&user("other", false)).unwrap();

        service.revoke(Some(format!("Bearer {}", first).as_str())).unwrap();
        assert_eq!(service.validate(Some(first.as_str())), Err(AuthError::TokenNotFound));
        assert!(service.validate(Some(second.as_str())).is_ok());

        assert_eq!(service.revoke_user(&reader.id).unwrap(), 1);
        assert_eq!(service.validate(Some(second.as_str())), Err(AuthError::TokenNotFound));
        assert!(service.validate(Some(other.as_str())).is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            token_lifetime_secs: 600,
            reference_utc_offset_minutes: -300,
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::new(start()));
        let service =
            TokenService::from_config(&config, Arc::new(TokenLedger::new()), clock).unwrap();
        assert_eq!(service.token_lifetime(), Duration::minutes(10));

        let invalid = AuthConfig {
            reference_utc_offset_minutes: 10_000,
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::new(start()));
        assert!(TokenService::from_config(&invalid, Arc::new(TokenLedger::new()), clock).is_err());

        let endless = AuthConfig {
            token_lifetime_secs: 10_000_000_000_000,
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::new(start()));
        assert!(TokenService::from_config(&endless, Arc::new(TokenLedger::new()), clock).is_err());
    }

    #[test]
    fn test_overflowing_expiry_is_an_issuance_error() {
        let (service, ledger, _) = setup();
        // About a million years past the start date, beyond what chrono represents
        let service = service.valid_for(Duration::days(365 * 1_000_000));

        let result = service.issue(&user("reader", false));
        assert!(matches!(result, Err(AuthError::Issuance { .. })));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failed_ledger_write_issues_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let ledger = Arc::new(TokenLedger::open(Some(path.clone())).unwrap());
        std::fs::create_dir_all(&path).unwrap();

        let clock = Arc::new(ManualClock::new(start()));
        let service = TokenService::new(b"test-secret", ledger.clone(), clock);

        assert!(matches!(
            service.issue(&user("reader", false)),
            Err(AuthError::Store { .. })
        ));
        assert!(ledger.is_empty());
    }
}
