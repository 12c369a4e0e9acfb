//! Per-request authorization decision.
//!
//! A single primitive serves every endpoint: verify the bearer token, then
//! intersect its role claims with the roles the endpoint requires.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::jwt::TokenSigner;
use super::{ADMINISTRATOR, CUSTOMER, TokenError};
use crate::models::auth::TokenClaims;

/// Set of roles of which a caller must hold at least one.
///
/// An empty set admits any caller with a valid token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePolicy {
    required: BTreeSet<String>,
}

impl RolePolicy {
    /// Any authenticated caller.
    pub fn any() -> Self {
        Self::default()
    }

    /// Mutation endpoints.
    pub fn administrator_only() -> Self {
        Self::from_roles([ADMINISTRATOR])
    }

    /// Read endpoints.
    pub fn reader() -> Self {
        Self::from_roles([ADMINISTRATOR, CUSTOMER])
    }

    pub fn from_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Whether a caller holding `roles` satisfies the policy.
    pub fn admits<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.required.is_empty() || roles.iter().any(|r| self.required.contains(r.as_ref()))
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No usable token.
    Unauthenticated(TokenError),
    /// Valid token without a required role.
    Forbidden,
}

/// Outcome of `authorize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(TokenClaims),
    Deny(DenyReason),
}

/// Decide whether the bearer of `token` may proceed under `policy` at `now`.
pub fn authorize(
    signer: &TokenSigner,
    token: &str,
    policy: &RolePolicy,
    now: DateTime<Utc>,
) -> Decision {
    let claims = match signer.verify(token, now) {
        Ok(claims) => claims,
        Err(e) => return Decision::Deny(DenyReason::Unauthenticated(e)),
    };
    if policy.admits(&claims.roles) {
        Decision::Allow(claims)
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;
    use crate::auth::jwt::JwtSettings;

    fn signer() -> TokenSigner {
        TokenSigner::new(&JwtSettings {
            secret: "gate-test-secret-gate-test-secret".into(),
            issuer: "bookstore".into(),
            expiration_minutes: 5,
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn token_with(signer: &TokenSigner, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        signer
            .issue("someone", "u-1", &roles, Uuid::new_v4(), now())
            .unwrap()
            .token
    }

    #[test]
    fn admin_passes_admin_policy() {
        let signer = signer();
        let token = token_with(&signer, &[ADMINISTRATOR]);
        let decision = authorize(&signer, &token, &RolePolicy::administrator_only(), now());
        assert!(matches!(decision, Decision::Allow(ref c) if c.has_role(ADMINISTRATOR)));
    }

    #[test]
    fn customer_is_forbidden_from_admin_policy() {
        let signer = signer();
        let token = token_with(&signer, &[CUSTOMER]);
        assert_eq!(
            authorize(&signer, &token, &RolePolicy::administrator_only(), now()),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn customer_passes_reader_policy() {
        let signer = signer();
        let token = token_with(&signer, &[CUSTOMER]);
        assert!(matches!(
            authorize(&signer, &token, &RolePolicy::reader(), now()),
            Decision::Allow(_)
        ));
    }

    #[test]
    fn roleless_token_passes_only_empty_policy() {
        let signer = signer();
        let token = token_with(&signer, &[]);
        assert!(matches!(
            authorize(&signer, &token, &RolePolicy::any(), now()),
            Decision::Allow(_)
        ));
        assert_eq!(
            authorize(&signer, &token, &RolePolicy::reader(), now()),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let signer = signer();
        let token = token_with(&signer, &[ADMINISTRATOR]);
        let later = now() + Duration::minutes(5);
        assert_eq!(
            authorize(&signer, &token, &RolePolicy::any(), later),
            Decision::Deny(DenyReason::Unauthenticated(TokenError::Expired))
        );
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        let signer = signer();
        assert_eq!(
            authorize(&signer, "garbage", &RolePolicy::any(), now()),
            Decision::Deny(DenyReason::Unauthenticated(TokenError::Malformed))
        );
    }

    #[test]
    fn role_names_are_open_strings() {
        let policy = RolePolicy::from_roles(["Auditor"]);
        assert!(policy.admits(&["Auditor"]));
        assert!(!policy.admits(&[ADMINISTRATOR]));
        assert_eq!(policy.required().len(), 1);
    }
}
